//! Topology and parameter models for feedforward unitary meshes.
//!
//! Models the physical layout of an N-port, L-layer grid of tunable
//! pairwise unitary devices (simulated interferometers): inter-layer
//! permutation wiring, tunable-device masks, phase initialization
//! contracts and fabrication-error transfer coefficients. Execution and
//! training of the mesh live outside this crate.

pub mod config;
pub mod error;
pub mod initializers;
pub mod model;
pub mod permutation;
pub mod stripe;

pub use config::{PhaseBasis, TEST_SEED};
pub use error::MeshError;
pub use initializers::{get_initializer, HaarFamily, Initializer, PhaseInitializer};
pub use model::{BsError, MeshModel, MeshOptions, PhaseSpec, PhaseTransform, Topology};
pub use permutation::{
    butterfly_permutation, get_default_coarse_grain_block_sizes,
    get_efficient_coarse_grain_block_sizes, grid_permutation, prm_permutation,
};
pub use stripe::to_stripe_array;
