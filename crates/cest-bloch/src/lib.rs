//! Bloch-McConnell propagation for exchanging proton pools under RF saturation.
//!
//! The pipeline is: an [`ExchangeNetwork`] (pools + directed exchange edges) and the
//! RF [`Irradiation`] parameters are assembled into a [`Generator`] (the matrix `A`
//! and forcing `b` of `dM/dt = A·M + b`); the generator is exponentiated into a
//! discrete-time propagator, either in projective (augmented) coordinates or in
//! reduced coordinates around the steady state; the shaped-pulse stepper folds the
//! propagator over a sequence of RF amplitude samples.
//!
//! [`TwoPool`] and [`ThreePoolPartial`] are typed front-ends over fixed-size
//! nalgebra vectors (6/7 and 9/10 components). The same operations are available
//! over dynamically-sized vectors for any validated network.
//!
//! Every entry point is a pure function of its arguments and is safe to call
//! concurrently from several threads.

pub mod error;
pub mod generator;
pub mod network;
pub mod propagator;
pub mod stepper;
pub mod three_pool;
pub mod two_pool;

pub use error::{BlochError, BlochResult};
pub use generator::{Generator, Irradiation};
pub use network::{ExchangeEdge, ExchangeNetwork, OffsetSource};
pub use propagator::{build_propagator, evolve, evolve_reduced, propagator, steady_state};
pub use stepper::{evolve_shaped, evolve_shaped_projective};
pub use three_pool::{Matrix10, ThirdPoolOffset, ThreePoolPartial, Vector9, Vector10};
pub use two_pool::{Matrix7, TwoPool, Vector6, Vector7};
