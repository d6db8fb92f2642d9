//! Stripe expansion of per-device coefficients to per-port arrays.

use ndarray::Array2;

/// Expand an `L x floor(N/2)` per-device coefficient array into an `L x N`
/// per-port array by duplicating each coefficient across its device's two
/// physical ports.
///
/// When `units` is odd the trailing unpaired port column is zero-filled.
pub fn to_stripe_array(coefficients: &Array2<f64>, units: usize) -> Array2<f64> {
    let num_layers = coefficients.nrows();
    let num_pairs = coefficients.ncols();
    let mut stripe = Array2::zeros((num_layers, units));

    for layer in 0..num_layers {
        for pair in 0..num_pairs {
            let value = coefficients[[layer, pair]];
            stripe[[layer, 2 * pair]] = value;
            stripe[[layer, 2 * pair + 1]] = value;
        }
    }

    stripe
}
