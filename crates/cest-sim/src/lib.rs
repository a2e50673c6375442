//! cest-sim: CEST experiments built on the Bloch-McConnell engine.
//!
//! Provides:
//! - RF pulse envelopes and pulse trains
//! - Saturation schemes (continuous wave, shaped)
//! - A catalog of brain metabolites with literature parameters
//! - Parallel Z-spectrum sweeps over RF offsets
//! - MTR asymmetry analysis
//!
//! # Example
//!
//! ```no_run
//! use cest_core::{microtesla, s, tesla};
//! use cest_sim::{Metabolite, Normalization, OffsetSweep, PoolModel, Saturation, ZSpectrumRequest};
//!
//! let creatine = Metabolite::Creatine.labile_pool().unwrap();
//! let model = PoolModel::from_pools(cest_sim::water().unwrap(), &[creatine]).unwrap();
//! let sweep = OffsetSweep::symmetric(5.0, 101).unwrap();
//! let request = ZSpectrumRequest::new(
//!     model,
//!     tesla(7.0),
//!     Saturation::continuous_wave(microtesla(2.0), s(1.0)),
//!     &sweep,
//! );
//!
//! let spectrum = request.run().unwrap();
//! let mtr = spectrum.mtr(Normalization::NormRef).unwrap();
//! println!("MTR at {} ppm: {}", mtr.offsets_ppm[20], mtr.values[20]);
//! ```

pub mod catalog;
pub mod error;
pub mod mtr;
pub mod pulses;
pub mod saturation;
pub mod sweeps;
pub mod zspectrum;

pub use catalog::{Metabolite, MetaboliteParams, relative_m0, water};
pub use error::{SimError, SimResult};
pub use mtr::{Mtr, Normalization, mtr};
pub use pulses::{MAX_PULSE_SAMPLES, PulseShape, train};
pub use saturation::{Drive, PulseTrain, Saturation};
pub use sweeps::OffsetSweep;
pub use zspectrum::{PoolModel, ZSpectrum, ZSpectrumRequest};
