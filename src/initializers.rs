//! Phase initializers for mesh parameters.
//!
//! An [`Initializer`] is an opaque capability handed to the execution
//! layer; invoking [`Initializer::generate`] yields a phase array whose
//! shape depends on the parameter kind (`L x floor(N/2)` for theta/phi,
//! `1 x N` for gamma).

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

use crate::config::TEST_SEED;
use crate::error::MeshError;

/// Pass-through initializer wrapping literal phase values.
#[derive(Clone, Debug)]
pub struct PhaseInitializer {
    values: Array2<f64>,
    units: usize,
}

impl PhaseInitializer {
    pub fn new(values: Array2<f64>, units: usize) -> Self {
        Self { values, units }
    }

    pub fn units(&self) -> usize {
        self.units
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }
}

/// Mesh family tag for Haar-measure theta sampling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HaarFamily {
    Rectangular,
    Triangular,
    PermutingRectangular,
}

/// Phase initialization capability.
#[derive(Clone, Debug)]
pub enum Initializer {
    /// Literal values, reproduced verbatim on every call.
    Literal(PhaseInitializer),
    /// Uniform random phases over `[0, 2*pi)`.
    Uniform {
        rows: usize,
        cols: usize,
        testing: bool,
    },
    /// Haar-measure theta sampling for a given mesh family. The family and
    /// hadamard tags are carried for the execution layer's convention
    /// handling.
    Haar {
        rows: usize,
        cols: usize,
        family: HaarFamily,
        hadamard: bool,
        testing: bool,
    },
}

impl Initializer {
    /// Shape of the arrays this initializer produces.
    pub fn shape(&self) -> (usize, usize) {
        match self {
            Self::Literal(init) => init.values.dim(),
            Self::Uniform { rows, cols, .. } | Self::Haar { rows, cols, .. } => (*rows, *cols),
        }
    }

    /// Draw one phase array. Testing-mode initializers ignore `rng` and
    /// draw from a fixed-seed stream so repeated calls are identical.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Array2<f64> {
        let testing = match self {
            Self::Literal(_) => false,
            Self::Uniform { testing, .. } | Self::Haar { testing, .. } => *testing,
        };
        if testing {
            let mut seeded = StdRng::seed_from_u64(TEST_SEED);
            self.sample(&mut seeded)
        } else {
            self.sample(rng)
        }
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Array2<f64> {
        match self {
            Self::Literal(init) => init.values.clone(),
            Self::Uniform { rows, cols, .. } => {
                draw(*rows, *cols, rng, |u| u * 2.0 * PI)
            }
            // Haar measure on a pairwise unitary gives theta the density
            // sin(theta) / 2 on [0, pi]; invert the CDF.
            Self::Haar { rows, cols, .. } => {
                draw(*rows, *cols, rng, |u| 2.0 * u.sqrt().asin())
            }
        }
    }
}

fn draw<R, F>(rows: usize, cols: usize, rng: &mut R, map: F) -> Array2<f64>
where
    R: Rng + ?Sized,
    F: Fn(f64) -> f64,
{
    let samples: Vec<f64> = (0..rows * cols).map(|_| map(rng.gen::<f64>())).collect();
    Array2::from_shape_vec((rows, cols), samples).unwrap()
}

/// Resolve a symbolic initializer name into an [`Initializer`].
pub fn get_initializer(
    units: usize,
    num_layers: usize,
    name: &str,
    hadamard: bool,
    testing: bool,
) -> Result<Initializer, MeshError> {
    let device_cols = units / 2;
    match name {
        "random_theta" | "random_phi" => Ok(Initializer::Uniform {
            rows: num_layers,
            cols: device_cols,
            testing,
        }),
        "random_gamma" => Ok(Initializer::Uniform {
            rows: 1,
            cols: units,
            testing,
        }),
        "haar_rect" => Ok(haar(num_layers, device_cols, HaarFamily::Rectangular, hadamard, testing)),
        "haar_tri" => Ok(haar(num_layers, device_cols, HaarFamily::Triangular, hadamard, testing)),
        "haar_prm" => Ok(haar(
            num_layers,
            device_cols,
            HaarFamily::PermutingRectangular,
            hadamard,
            testing,
        )),
        other => Err(MeshError::UnknownInitializer(other.to_string())),
    }
}

fn haar(rows: usize, cols: usize, family: HaarFamily, hadamard: bool, testing: bool) -> Initializer {
    Initializer::Haar {
        rows,
        cols,
        family,
        hadamard,
        testing,
    }
}
