//! Mesh topology and parameter models.
//!
//! A [`MeshModel`] holds the validated layout of an N-port, L-layer mesh
//! of pairwise unitary devices: the inter-layer wiring, the per-layer
//! tunable-device mask, the phase-parameter initialization specs and the
//! beamsplitter fabrication-error configuration. Execution engines query
//! [`MeshModel::init`] for parameter initializers and
//! [`MeshModel::mzi_error_tensors`] for the error-adjusted transfer
//! coefficients.

use log::debug;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_4;

use crate::config::{PhaseBasis, TEST_SEED};
use crate::error::MeshError;
use crate::initializers::{get_initializer, Initializer, PhaseInitializer};
use crate::permutation::{
    butterfly_permutation, get_default_coarse_grain_block_sizes,
    get_efficient_coarse_grain_block_sizes, grid_permutation, prm_permutation,
};
use crate::stripe::to_stripe_array;

/// Elementwise transform the execution layer applies to a phase parameter
/// after initialization. Stored verbatim, never invoked here.
pub type PhaseTransform = fn(f64) -> f64;

/// Specification for one phase parameter (theta, phi or gamma).
#[derive(Clone, Debug)]
pub enum PhaseSpec {
    /// Symbolic initializer name resolved through [`get_initializer`].
    Named(String),
    /// Literal phase values, wrapped as a pass-through initializer.
    Literal(Array2<f64>),
    /// Symbolic name plus a parameter transform for the execution layer.
    NamedWithTransform(String, PhaseTransform),
}

impl PhaseSpec {
    pub fn named(name: &str) -> Self {
        Self::Named(name.to_string())
    }

    /// The transform attached to this spec, if any.
    pub fn transform(&self) -> Option<PhaseTransform> {
        match self {
            Self::NamedWithTransform(_, f) => Some(*f),
            _ => None,
        }
    }
}

impl From<&str> for PhaseSpec {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

impl From<Array2<f64>> for PhaseSpec {
    fn from(values: Array2<f64>) -> Self {
        Self::Literal(values)
    }
}

/// Beamsplitter fabrication error: deviation from the ideal 45-degree
/// splitting angle.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum BsError {
    /// Standard deviation of a zero-mean Gaussian error drawn per device.
    Scalar(f64),
    /// Explicit per-device error shared by both beamsplitters.
    Matrix(Array2<f64>),
    /// Distinct left/right per-device errors.
    Pair(Array2<f64>, Array2<f64>),
}

impl Default for BsError {
    fn default() -> Self {
        Self::Scalar(0.0)
    }
}

impl From<f64> for BsError {
    fn from(sigma: f64) -> Self {
        Self::Scalar(sigma)
    }
}

/// Construction options shared by every mesh variant.
#[derive(Clone, Debug, Default)]
pub struct MeshOptions {
    /// Hadamard convention flag, forwarded to initializer selection.
    pub hadamard: bool,
    pub bs_error: BsError,
    /// Reseed error and phase sampling to `TEST_SEED` for reproducibility.
    pub testing: bool,
    /// Draw left and right beamsplitter errors independently.
    pub use_different_errors: bool,
    /// `None` selects the topology's default theta initializer.
    pub theta_init: Option<PhaseSpec>,
    /// `None` selects `random_phi`.
    pub phi_init: Option<PhaseSpec>,
    /// `None` selects `random_gamma`.
    pub gamma_init: Option<PhaseSpec>,
    pub basis: PhaseBasis,
}

/// Closed set of mesh topology families.
///
/// Each family computes its own wiring and tunable-count layout, then
/// delegates validation and storage to [`MeshModel::new`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Topology {
    /// N-port grid, L layers (defaults to N), alternating device counts.
    Rectangular {
        units: usize,
        num_layers: Option<usize>,
    },
    /// N-port grid with the fixed depth L = 2N - 3 and a diamond-shaped
    /// device-count profile.
    Triangular { units: usize },
    /// `N = 2^L` ports paired at doubling distances. Not universal.
    Butterfly { num_layers: usize },
    /// Coarse-grained blocks of rectangular layers separated by sampling
    /// permutations.
    PermutingRectangular {
        units: usize,
        tunable_layers_per_block: Option<usize>,
        num_tunable_layers_list: Option<Vec<usize>>,
        sampling_frequencies: Option<Vec<usize>>,
    },
}

/// Rectangular alternating tunable counts: floor(N/2) on even layers,
/// floor((N-1)/2) on odd layers.
fn alternating_counts(units: usize, num_layers: usize) -> Vec<usize> {
    (0..num_layers)
        .map(|layer| {
            if layer % 2 == 0 {
                units / 2
            } else {
                (units - 1) / 2
            }
        })
        .collect()
}

impl Topology {
    /// Default theta initializer name for this family.
    pub fn default_theta(&self) -> &'static str {
        match self {
            Self::Rectangular { .. } => "haar_rect",
            Self::Triangular { .. } => "haar_tri",
            Self::Butterfly { .. } => "random_theta",
            Self::PermutingRectangular { .. } => "haar_prm",
        }
    }

    /// Compute the permutation wiring and per-layer tunable counts.
    /// `None` counts mean the base model default of floor(N/2) per layer.
    pub fn build_layout(&self) -> Result<(Array2<usize>, Option<Vec<usize>>), MeshError> {
        match self {
            Self::Rectangular { units, num_layers } => {
                let units = *units;
                if units < 2 {
                    return Err(MeshError::Configuration(format!(
                        "units must be at least 2, got {units}"
                    )));
                }
                let num_layers = num_layers.unwrap_or(units);
                let perm_idx = grid_permutation(units, num_layers);
                Ok((perm_idx, Some(alternating_counts(units, num_layers))))
            }
            Self::Triangular { units } => {
                let units = *units;
                if units < 2 {
                    return Err(MeshError::Configuration(format!(
                        "units must be at least 2, got {units}"
                    )));
                }
                let num_layers = 2 * units - 3;
                let perm_idx = grid_permutation(units, num_layers);
                // Device count ramps 1..N-1 then back down to 1; the
                // tunable count is the ceil-half of each entry. Keep the
                // exact arithmetic: off-by-one changes move devices.
                let num_tunable = (1..units)
                    .chain((1..units.saturating_sub(1)).rev())
                    .map(|v| (v + 1) / 2)
                    .collect();
                Ok((perm_idx, Some(num_tunable)))
            }
            Self::Butterfly { num_layers } => Ok((butterfly_permutation(*num_layers), None)),
            Self::PermutingRectangular {
                units,
                tunable_layers_per_block,
                num_tunable_layers_list,
                sampling_frequencies,
            } => {
                let units = *units;
                if units < 2 {
                    return Err(MeshError::Configuration(format!(
                        "units must be at least 2, got {units}"
                    )));
                }
                let (block_sizes, frequencies) = if let Some(per_block) = tunable_layers_per_block {
                    get_efficient_coarse_grain_block_sizes(units, *per_block)
                } else if let (Some(sizes), Some(frequencies)) =
                    (num_tunable_layers_list, sampling_frequencies)
                {
                    if frequencies.len() + 1 != sizes.len() {
                        return Err(MeshError::Configuration(format!(
                            "{} blocks require {} sampling frequencies, got {}",
                            sizes.len(),
                            sizes.len().saturating_sub(1),
                            frequencies.len()
                        )));
                    }
                    (sizes.clone(), frequencies.clone())
                } else {
                    get_default_coarse_grain_block_sizes(units)
                };
                debug!(
                    "permuting rectangular layout: {} blocks, {} layers",
                    block_sizes.len(),
                    block_sizes.iter().sum::<usize>()
                );

                let mut num_tunable = Vec::with_capacity(block_sizes.iter().sum());
                for &block_size in &block_sizes {
                    num_tunable.extend(alternating_counts(units, block_size));
                }
                let perm_idx = prm_permutation(units, &block_sizes, &frequencies, false);
                Ok((perm_idx, Some(num_tunable)))
            }
        }
    }
}

/// Validated mesh topology instance. Immutable after construction.
#[derive(Clone, Debug)]
pub struct MeshModel {
    units: usize,
    num_layers: usize,
    perm_idx: Array2<usize>,
    num_tunable: Vec<usize>,
    mask: Array2<f64>,
    hadamard: bool,
    bs_error: BsError,
    testing: bool,
    use_different_errors: bool,
    theta_init: PhaseSpec,
    phi_init: PhaseSpec,
    gamma_init: PhaseSpec,
    basis: PhaseBasis,
}

impl MeshModel {
    /// Build a model from an explicit `(L+1) x N` wiring array.
    ///
    /// `perm_idx` is the authoritative shape source: `N` is its column
    /// count and `L` its row count minus one. `num_tunable` defaults to
    /// floor(N/2) devices on every layer.
    pub fn new(
        perm_idx: Array2<usize>,
        num_tunable: Option<Vec<usize>>,
        opts: MeshOptions,
    ) -> Result<Self, MeshError> {
        if perm_idx.nrows() < 2 {
            return Err(MeshError::Configuration(
                "perm_idx must have at least two wiring rows".to_string(),
            ));
        }
        let units = perm_idx.ncols();
        let num_layers = perm_idx.nrows() - 1;
        if units < 2 {
            return Err(MeshError::Configuration(format!(
                "units must be at least 2, got {units}"
            )));
        }
        let num_tunable = num_tunable.unwrap_or_else(|| vec![units / 2; num_layers]);
        if num_tunable.len() != num_layers {
            return Err(MeshError::Configuration(format!(
                "num_tunable has {} entries but the mesh has {} layers",
                num_tunable.len(),
                num_layers
            )));
        }

        // Left-aligned tunable placement: the first num_tunable[l] device
        // slots of layer l are active, the rest are fixed pass-throughs.
        let mut mask = Array2::<f64>::zeros((num_layers, units / 2));
        for (layer, &count) in num_tunable.iter().enumerate() {
            for device in 0..count.min(units / 2) {
                mask[[layer, device]] = 1.0;
            }
        }
        debug!("constructed mesh model: units={units} layers={num_layers}");

        Ok(Self {
            units,
            num_layers,
            perm_idx,
            num_tunable,
            mask,
            hadamard: opts.hadamard,
            bs_error: opts.bs_error,
            testing: opts.testing,
            use_different_errors: opts.use_different_errors,
            theta_init: opts.theta_init.unwrap_or_else(|| PhaseSpec::named("random_theta")),
            phi_init: opts.phi_init.unwrap_or_else(|| PhaseSpec::named("random_phi")),
            gamma_init: opts.gamma_init.unwrap_or_else(|| PhaseSpec::named("random_gamma")),
            basis: opts.basis,
        })
    }

    /// Build a model for one of the closed topology families.
    pub fn with_topology(topology: Topology, mut opts: MeshOptions) -> Result<Self, MeshError> {
        if opts.theta_init.is_none() {
            opts.theta_init = Some(PhaseSpec::named(topology.default_theta()));
        }
        let (perm_idx, num_tunable) = topology.build_layout()?;
        Self::new(perm_idx, num_tunable, opts)
    }

    /// Rectangular mesh of `units` ports; `num_layers` defaults to `units`.
    pub fn rectangular(
        units: usize,
        num_layers: Option<usize>,
        opts: MeshOptions,
    ) -> Result<Self, MeshError> {
        Self::with_topology(Topology::Rectangular { units, num_layers }, opts)
    }

    /// Triangular mesh of `units` ports with fixed depth `2 * units - 3`.
    pub fn triangular(units: usize, opts: MeshOptions) -> Result<Self, MeshError> {
        Self::with_topology(Topology::Triangular { units }, opts)
    }

    /// Butterfly mesh of `2^num_layers` ports.
    pub fn butterfly(num_layers: usize, opts: MeshOptions) -> Result<Self, MeshError> {
        Self::with_topology(Topology::Butterfly { num_layers }, opts)
    }

    /// Permuting rectangular mesh. `tunable_layers_per_block` overrides the
    /// explicit lists; the explicit lists apply only when both are given,
    /// otherwise the default block sizing is used.
    pub fn permuting_rectangular(
        units: usize,
        tunable_layers_per_block: Option<usize>,
        num_tunable_layers_list: Option<Vec<usize>>,
        sampling_frequencies: Option<Vec<usize>>,
        opts: MeshOptions,
    ) -> Result<Self, MeshError> {
        Self::with_topology(
            Topology::PermutingRectangular {
                units,
                tunable_layers_per_block,
                num_tunable_layers_list,
                sampling_frequencies,
            },
            opts,
        )
    }

    pub fn units(&self) -> usize {
        self.units
    }

    pub fn num_layers(&self) -> usize {
        self.num_layers
    }

    /// Layer-to-port wiring, `(L+1) x N`.
    pub fn perm_idx(&self) -> &Array2<usize> {
        &self.perm_idx
    }

    /// Tunable device count per layer.
    pub fn num_tunable(&self) -> &[usize] {
        &self.num_tunable
    }

    /// Binary tunable mask, `L x floor(N/2)`.
    pub fn mask(&self) -> &Array2<f64> {
        &self.mask
    }

    pub fn hadamard(&self) -> bool {
        self.hadamard
    }

    pub fn testing(&self) -> bool {
        self.testing
    }

    pub fn basis(&self) -> PhaseBasis {
        self.basis
    }

    pub fn theta_transform(&self) -> Option<PhaseTransform> {
        self.theta_init.transform()
    }

    pub fn phi_transform(&self) -> Option<PhaseTransform> {
        self.phi_init.transform()
    }

    pub fn gamma_transform(&self) -> Option<PhaseTransform> {
        self.gamma_init.transform()
    }

    /// Resolve the three phase initializers, in the fixed order
    /// (theta, phi, gamma).
    pub fn init(&self) -> Result<(Initializer, Initializer, Initializer), MeshError> {
        Ok((
            self.resolve(&self.theta_init)?,
            self.resolve(&self.phi_init)?,
            self.resolve(&self.gamma_init)?,
        ))
    }

    fn resolve(&self, spec: &PhaseSpec) -> Result<Initializer, MeshError> {
        match spec {
            PhaseSpec::Literal(values) => Ok(Initializer::Literal(PhaseInitializer::new(
                values.clone(),
                self.units,
            ))),
            PhaseSpec::Named(name) | PhaseSpec::NamedWithTransform(name, _) => {
                get_initializer(self.units, self.num_layers, name, self.hadamard, self.testing)
            }
        }
    }

    /// Left/right per-device beamsplitter errors, `L x floor(N/2)` each,
    /// masked so non-tunable slots carry zero error.
    ///
    /// Scalar configurations draw N(0, sigma^2) samples from `rng`; in
    /// testing mode a private `TEST_SEED`-seeded stream is used instead
    /// (and `TEST_SEED + 1` for an independent right draw), so repeated
    /// calls are identical. Explicit arrays must match the mask shape and
    /// are returned deterministically.
    pub fn mzi_error_matrices<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<(Array2<f64>, Array2<f64>), MeshError> {
        let shape = self.mask.dim();
        let (e_l, e_r) = match &self.bs_error {
            BsError::Scalar(sigma) => {
                let e_l = if self.testing {
                    let mut seeded = StdRng::seed_from_u64(TEST_SEED);
                    gaussian(shape, *sigma, &mut seeded)
                } else {
                    gaussian(shape, *sigma, rng)
                };
                let e_r = if self.use_different_errors {
                    if self.testing {
                        let mut seeded = StdRng::seed_from_u64(TEST_SEED + 1);
                        gaussian(shape, *sigma, &mut seeded)
                    } else {
                        gaussian(shape, *sigma, rng)
                    }
                } else {
                    e_l.clone()
                };
                (e_l, e_r)
            }
            BsError::Matrix(values) => {
                check_shape(values, shape)?;
                (values.clone(), values.clone())
            }
            BsError::Pair(left, right) => {
                check_shape(left, shape)?;
                check_shape(right, shape)?;
                (left.clone(), right.clone())
            }
        };
        Ok((&e_l * &self.mask, &e_r * &self.mask))
    }

    /// The four striped transfer coefficients of the error-perturbed
    /// beamsplitter pair, `L x N` each, in the fixed order
    /// (ss, cs, sc, cc):
    ///
    /// ```text
    /// ss = 2 * stripe(sin(pi/4 + e_l) * sin(pi/4 + e_r))
    /// cs = 2 * stripe(cos(pi/4 + e_l) * sin(pi/4 + e_r))
    /// sc = 2 * stripe(sin(pi/4 + e_l) * cos(pi/4 + e_r))
    /// cc = 2 * stripe(cos(pi/4 + e_l) * cos(pi/4 + e_r))
    /// ```
    ///
    /// Deterministic given (e_l, e_r, mask).
    #[allow(clippy::type_complexity)]
    pub fn mzi_error_tensors<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<(Array2<f64>, Array2<f64>, Array2<f64>, Array2<f64>), MeshError> {
        let (e_l, e_r) = self.mzi_error_matrices(rng)?;

        let sin_l = e_l.mapv(|e| (FRAC_PI_4 + e).sin());
        let cos_l = e_l.mapv(|e| (FRAC_PI_4 + e).cos());
        let sin_r = e_r.mapv(|e| (FRAC_PI_4 + e).sin());
        let cos_r = e_r.mapv(|e| (FRAC_PI_4 + e).cos());

        let ss = to_stripe_array(&(&sin_l * &sin_r), self.units) * 2.0;
        let cs = to_stripe_array(&(&cos_l * &sin_r), self.units) * 2.0;
        let sc = to_stripe_array(&(&sin_l * &cos_r), self.units) * 2.0;
        let cc = to_stripe_array(&(&cos_l * &cos_r), self.units) * 2.0;

        Ok((ss, cs, sc, cc))
    }
}

fn gaussian<R: Rng + ?Sized>(shape: (usize, usize), sigma: f64, rng: &mut R) -> Array2<f64> {
    let (rows, cols) = shape;
    let samples: Vec<f64> = (0..rows * cols)
        .map(|_| {
            let z: f64 = StandardNormal.sample(rng);
            sigma * z
        })
        .collect();
    Array2::from_shape_vec((rows, cols), samples).unwrap()
}

fn check_shape(values: &Array2<f64>, expected: (usize, usize)) -> Result<(), MeshError> {
    if values.dim() != expected {
        return Err(MeshError::ShapeMismatch {
            got: values.dim(),
            expected,
        });
    }
    Ok(())
}
