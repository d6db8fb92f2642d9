//! Permutation providers for mesh wiring.
//!
//! Each provider returns an `(L+1) x N` integer array: row 0 orders the
//! inputs, row `l + 1` carries the wiring applied after layer `l`. Every
//! row is a permutation of `0..N`.

use ndarray::Array2;

fn identity(units: usize) -> Vec<usize> {
    (0..units).collect()
}

/// Circular shift of the identity ordering. `shift = 1` moves every signal
/// one port down, `shift = -1` one port up.
fn rolled(units: usize, shift: i64) -> Vec<usize> {
    let n = units as i64;
    (0..n).map(|i| ((i + shift).rem_euclid(n)) as usize).collect()
}

/// Gather ports paired at distance `frequency` into adjacent slots, block
/// by block. Ports past the last full block keep their position.
fn interleave(units: usize, frequency: usize) -> Vec<usize> {
    let f = frequency.clamp(1, (units / 2).max(1));
    let mut row = identity(units);
    let block = 2 * f;
    let mut start = 0;
    while start + block <= units {
        for j in 0..f {
            row[start + 2 * j] = start + j;
            row[start + 2 * j + 1] = start + j + f;
        }
        start += block;
    }
    row
}

/// Swap the two halves of each `2 * frequency` port group. Used as the
/// coarse-grained sampling layer of the permuting rectangular mesh.
fn swap_halves(units: usize, frequency: usize) -> Vec<usize> {
    let f = frequency.clamp(1, (units / 2).max(1));
    let mut row = identity(units);
    let block = 2 * f;
    let mut start = 0;
    while start + block <= units {
        for j in 0..f {
            row[start + j] = start + j + f;
            row[start + f + j] = start + j;
        }
        start += block;
    }
    row
}

fn stack_rows(rows: Vec<Vec<usize>>, units: usize) -> Array2<usize> {
    let flat: Vec<usize> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((flat.len() / units, units), flat).unwrap()
}

/// Grid permutation for rectangular and triangular meshes: identity input
/// ordering, then alternating down/up circular shifts between layers.
pub fn grid_permutation(units: usize, num_layers: usize) -> Array2<usize> {
    let mut rows = Vec::with_capacity(num_layers + 1);
    rows.push(identity(units));
    for layer in 0..num_layers {
        let shift = if layer % 2 == 0 { -1 } else { 1 };
        rows.push(rolled(units, shift));
    }
    stack_rows(rows, units)
}

/// Butterfly permutation over `N = 2^L` ports: layer `l` pairs ports at
/// distance `2^l`, gathered into adjacent slots.
pub fn butterfly_permutation(num_layers: usize) -> Array2<usize> {
    let units = 1usize << num_layers;
    let mut rows = Vec::with_capacity(num_layers + 1);
    for layer in 0..num_layers {
        rows.push(interleave(units, 1 << layer));
    }
    rows.push(identity(units));
    stack_rows(rows, units)
}

/// Permuting rectangular permutation: grid wiring inside each tunable
/// block, one coarse-grained sampling row between consecutive blocks.
pub fn prm_permutation(
    units: usize,
    tunable_block_sizes: &[usize],
    sampling_frequencies: &[usize],
    butterfly: bool,
) -> Array2<usize> {
    let num_blocks = tunable_block_sizes.len();
    let total: usize = tunable_block_sizes.iter().sum();
    let mut rows = Vec::with_capacity(total + 1);
    rows.push(identity(units));

    let mut layer = 0;
    for (block, &block_size) in tunable_block_sizes.iter().enumerate() {
        for i in 0..block_size {
            let last_in_block = i + 1 == block_size;
            if last_in_block && block + 1 < num_blocks {
                let frequency = sampling_frequencies[block];
                rows.push(if butterfly {
                    interleave(units, frequency)
                } else {
                    swap_halves(units, frequency)
                });
            } else {
                let shift = if layer % 2 == 0 { -1 } else { 1 };
                rows.push(rolled(units, shift));
            }
            layer += 1;
        }
    }
    stack_rows(rows, units)
}

/// Block sizing for a target number of tunable layers per block: equal
/// blocks with halving sampling frequencies, widest shuffle first.
pub fn get_efficient_coarse_grain_block_sizes(
    units: usize,
    tunable_layers_per_block: usize,
) -> (Vec<usize>, Vec<usize>) {
    let per_block = tunable_layers_per_block.max(1);
    let num_blocks = (units / per_block).max(1);
    let block_sizes = vec![per_block; num_blocks];

    let mut frequencies = Vec::with_capacity(num_blocks.saturating_sub(1));
    let mut frequency = (units / 2).max(1);
    for _ in 1..num_blocks {
        frequencies.push(frequency);
        frequency = (frequency / 2).max(1);
    }
    (block_sizes, frequencies)
}

/// Default block sizing: about `log2(N)` blocks covering roughly `N`
/// tunable layers, with doubling sampling frequencies.
pub fn get_default_coarse_grain_block_sizes(units: usize) -> (Vec<usize>, Vec<usize>) {
    let num_blocks = ((units as f64).log2().round() as usize).max(1);
    let block_sizes = vec![(units / num_blocks).max(1); num_blocks];
    let frequencies = (1..num_blocks)
        .map(|block| (1usize << block).min((units / 2).max(1)))
        .collect();
    (block_sizes, frequencies)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_rows_are_permutations(perm: &Array2<usize>) {
        let units = perm.ncols();
        for row in perm.rows() {
            let mut sorted: Vec<usize> = row.iter().copied().collect();
            sorted.sort_unstable();
            assert_eq!(sorted, (0..units).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_grid_permutation_shape() {
        let perm = grid_permutation(6, 4);
        assert_eq!(perm.dim(), (5, 6));
        assert_rows_are_permutations(&perm);
    }

    #[test]
    fn test_grid_permutation_identity_input_row() {
        let perm = grid_permutation(4, 2);
        assert_eq!(perm.row(0).to_vec(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_butterfly_permutation_shape() {
        let perm = butterfly_permutation(3);
        assert_eq!(perm.dim(), (4, 8));
        assert_rows_are_permutations(&perm);
    }

    #[test]
    fn test_butterfly_gathers_pairs_at_doubling_distances() {
        let perm = butterfly_permutation(3);
        // Frequency 1 degenerates to the identity ordering; frequency 2
        // gathers ports two apart into adjacent slots.
        assert_eq!(perm.row(0).to_vec(), vec![0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(perm.row(1).to_vec(), vec![0, 2, 1, 3, 4, 6, 5, 7]);
    }

    #[test]
    fn test_prm_permutation_row_count() {
        let perm = prm_permutation(8, &[2, 2, 2], &[4, 2], false);
        assert_eq!(perm.dim(), (7, 8));
        assert_rows_are_permutations(&perm);
    }

    #[test]
    fn test_prm_permutation_butterfly_sampling() {
        let perm = prm_permutation(8, &[1, 1], &[2], true);
        assert_eq!(perm.dim(), (3, 8));
        assert_rows_are_permutations(&perm);
    }

    #[test]
    fn test_efficient_block_sizes_cover_requested_layers() {
        let (sizes, frequencies) = get_efficient_coarse_grain_block_sizes(8, 2);
        assert_eq!(sizes, vec![2, 2, 2, 2]);
        assert_eq!(frequencies.len(), sizes.len() - 1);
    }

    #[test]
    fn test_default_block_sizes() {
        let (sizes, frequencies) = get_default_coarse_grain_block_sizes(8);
        assert_eq!(sizes.len(), 3);
        assert_eq!(frequencies.len(), 2);
        assert!(sizes.iter().all(|&s| s >= 1));
    }
}
