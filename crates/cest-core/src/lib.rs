//! cest-core: stable foundation for the CEST simulation workspace.
//!
//! Contains:
//! - units (uom SI types + constructors, gyromagnetic constants)
//! - numeric (float guards for physical parameters)
//! - species (physical parameters of one proton pool)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod species;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CestError, CestResult};
pub use numeric::*;
pub use species::{LabilePool, Species};
pub use units::*;
