//! Z-spectrum simulation: bulk-pool magnetization after saturation at each RF offset.
//!
//! Offsets are independent evaluations of the propagator, so the sweep runs them in
//! parallel. The per-offset pulse fold stays sequential.

use cest_bloch::{BlochResult, Irradiation, ThirdPoolOffset, ThreePoolPartial, TwoPool};
use cest_core::constants::larmor;
use cest_core::{Field, LabilePool, Species, ensure_finite, ensure_positive};
use rayon::prelude::*;
use tracing::{debug, debug_span};

use crate::error::{SimError, SimResult};
use crate::mtr::{Mtr, Normalization, mtr};
use crate::saturation::{Drive, Saturation};
use crate::sweeps::OffsetSweep;

/// Exchange topology of a simulation: bulk pool plus one or two labile pools.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PoolModel {
    Two(TwoPool),
    Three(ThreePoolPartial),
}

impl PoolModel {
    /// Bulk pool exchanging with each of `labile` (one or two pools).
    pub fn from_pools(bulk: Species, labile: &[LabilePool]) -> SimResult<Self> {
        match labile {
            [b] => Ok(PoolModel::Two(TwoPool::from_labile(bulk, *b))),
            [b, c] => Ok(PoolModel::Three(ThreePoolPartial::new(
                bulk,
                b.species,
                c.species,
                b.exchange_rate,
                c.exchange_rate,
            )?)),
            _ => Err(SimError::PoolCount {
                count: labile.len() + 1,
            }),
        }
    }

    /// Select pool C's resonance; no effect on a two-pool model.
    pub fn with_third_pool_offset(self, offset: ThirdPoolOffset) -> Self {
        match self {
            PoolModel::Three(m) => PoolModel::Three(m.with_c_offset(offset)),
            two => two,
        }
    }

    pub fn pool_count(&self) -> usize {
        match self {
            PoolModel::Two(_) => 2,
            PoolModel::Three(_) => 3,
        }
    }

    pub fn bulk(&self) -> Species {
        match self {
            PoolModel::Two(m) => m.a,
            PoolModel::Three(m) => m.a,
        }
    }

    /// Magnetization of every pool after `drive`, starting from thermal equilibrium.
    ///
    /// Constant drives use the reduced form; sampled drives fold in projective
    /// coordinates.
    pub fn saturate(&self, irradiation: &Irradiation, drive: &Drive) -> BlochResult<Vec<f64>> {
        match (self, drive) {
            (PoolModel::Two(m), Drive::Constant { w1, duration }) => {
                let out = m.evolve(irradiation, *w1, *duration, &m.equilibrium())?;
                Ok(out.iter().copied().collect())
            }
            (PoolModel::Two(m), Drive::Samples { amplitudes, step }) => {
                let out = m.evolve_shaped_projective(
                    irradiation,
                    amplitudes,
                    *step,
                    &m.equilibrium_projective(),
                )?;
                Ok(out.iter().take(6).copied().collect())
            }
            (PoolModel::Three(m), Drive::Constant { w1, duration }) => {
                let out = m.evolve(irradiation, *w1, *duration, &m.equilibrium())?;
                Ok(out.iter().copied().collect())
            }
            (PoolModel::Three(m), Drive::Samples { amplitudes, step }) => {
                let out = m.evolve_shaped_projective(
                    irradiation,
                    amplitudes,
                    *step,
                    &m.equilibrium_projective(),
                )?;
                Ok(out.iter().take(9).copied().collect())
            }
        }
    }
}

/// A full Z-spectrum simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct ZSpectrumRequest {
    pub model: PoolModel,
    pub b0: Field,
    /// B0 inhomogeneity (ppm); moves every resonance by this amount.
    pub b0_shift_ppm: f64,
    pub saturation: Saturation,
    /// RF offsets (ppm), evaluated in this order.
    pub offsets_ppm: Vec<f64>,
}

impl ZSpectrumRequest {
    pub fn new(model: PoolModel, b0: Field, saturation: Saturation, sweep: &OffsetSweep) -> Self {
        Self {
            model,
            b0,
            b0_shift_ppm: 0.0,
            saturation,
            offsets_ppm: sweep.points(),
        }
    }

    pub fn with_b0_shift(mut self, shift_ppm: f64) -> Self {
        self.b0_shift_ppm = shift_ppm;
        self
    }

    /// Evaluate every offset; the first failing offset aborts the sweep.
    pub fn run(&self) -> SimResult<ZSpectrum> {
        let span = debug_span!(
            "z_spectrum",
            pools = self.model.pool_count(),
            offsets = self.offsets_ppm.len()
        );
        let _enter = span.enter();

        let w0 = ensure_positive(larmor(self.b0), "B0")?;
        let shift = ensure_finite(self.b0_shift_ppm, "B0 shift")?;
        if self.offsets_ppm.is_empty() {
            return Err(SimError::InvalidArg {
                what: "Z-spectrum needs at least one offset",
            });
        }
        let drive = self.saturation.drive()?;
        let m0a = self.model.bulk().m0();
        debug!(w0, shift, duration = drive.duration(), "running Z-spectrum");

        let z = self
            .offsets_ppm
            .par_iter()
            .map(|&offset_ppm| {
                let irradiation = Irradiation::new(w0, offset_ppm).with_b0_shift(shift);
                self.model
                    .saturate(&irradiation, &drive)
                    .map(|m| m[2] / m0a)
                    .map_err(|source| SimError::Offset { offset_ppm, source })
            })
            .collect::<SimResult<Vec<f64>>>()?;

        debug!("Z-spectrum complete");
        Ok(ZSpectrum {
            offsets_ppm: self.offsets_ppm.clone(),
            z,
        })
    }
}

/// Normalized bulk magnetization `Mz/M0` at each RF offset.
#[derive(Debug, Clone, PartialEq)]
pub struct ZSpectrum {
    pub offsets_ppm: Vec<f64>,
    pub z: Vec<f64>,
}

impl ZSpectrum {
    pub fn len(&self) -> usize {
        self.z.len()
    }

    pub fn is_empty(&self) -> bool {
        self.z.is_empty()
    }

    /// `(offset_ppm, z)` pairs in sweep order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.offsets_ppm.iter().copied().zip(self.z.iter().copied())
    }

    /// Offset and value of the deepest saturation.
    pub fn minimum(&self) -> Option<(f64, f64)> {
        self.iter().min_by(|a, b| a.1.total_cmp(&b.1))
    }

    pub fn mtr(&self, normalization: Normalization) -> SimResult<Mtr> {
        mtr(&self.z, &self.offsets_ppm, normalization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Metabolite, water};
    use crate::pulses::PulseShape;
    use cest_core::{microtesla, ms, s, tesla};

    fn creatine_model() -> PoolModel {
        let pool = Metabolite::Creatine.scaled_labile_pool(20.0).unwrap();
        PoolModel::from_pools(water().unwrap(), &[pool]).unwrap()
    }

    #[test]
    fn pool_count_is_checked() {
        let w = water().unwrap();
        assert!(matches!(
            PoolModel::from_pools(w, &[]),
            Err(SimError::PoolCount { count: 1 })
        ));
        let pool = Metabolite::Creatine.labile_pool().unwrap();
        assert!(matches!(
            PoolModel::from_pools(w, &[pool, pool, pool]),
            Err(SimError::PoolCount { count: 4 })
        ));
        assert_eq!(PoolModel::from_pools(w, &[pool, pool]).unwrap().pool_count(), 3);
    }

    #[test]
    fn water_dip_is_at_zero() {
        let sweep = OffsetSweep::linear(-4.0, 4.0, 17).unwrap();
        let request = ZSpectrumRequest::new(
            creatine_model(),
            tesla(7.0),
            Saturation::continuous_wave(microtesla(2.0), s(1.0)),
            &sweep,
        );
        let spectrum = request.run().unwrap();
        assert_eq!(spectrum.len(), 17);
        let (ppm, z) = spectrum.minimum().unwrap();
        assert!(ppm.abs() < 1e-12);
        assert!(z < 0.1);
        assert!(spectrum.z.iter().all(|&z| z > -1.0 && z <= 1.0 + 1e-12));
    }

    #[test]
    fn b0_shift_moves_the_water_dip() {
        let sweep = OffsetSweep::linear(-2.0, 2.0, 9).unwrap();
        let spectrum = ZSpectrumRequest::new(
            creatine_model(),
            tesla(7.0),
            Saturation::continuous_wave(microtesla(1.0), s(1.0)),
            &sweep,
        )
        .with_b0_shift(0.5)
        .run()
        .unwrap();
        let (ppm, _) = spectrum.minimum().unwrap();
        assert!((ppm - 0.5).abs() < 1e-12);
    }

    #[test]
    fn shaped_and_cw_spectra_are_close_far_from_water() {
        let sweep = OffsetSweep::linear(3.0, 5.0, 3).unwrap();
        let cw = ZSpectrumRequest::new(
            creatine_model(),
            tesla(7.0),
            Saturation::continuous_wave(microtesla(1.0), ms(200.0)),
            &sweep,
        )
        .run()
        .unwrap();
        let block = ZSpectrumRequest::new(
            creatine_model(),
            tesla(7.0),
            Saturation::shaped(PulseShape::Block, microtesla(1.0), ms(200.0), ms(20.0)),
            &sweep,
        )
        .run()
        .unwrap();
        for (a, b) in cw.z.iter().zip(&block.z) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn failing_offset_is_reported() {
        let mut request = ZSpectrumRequest::new(
            creatine_model(),
            tesla(3.0),
            Saturation::continuous_wave(microtesla(1.0), s(1.0)),
            &OffsetSweep::linear(-1.0, 1.0, 3).unwrap(),
        );
        request.offsets_ppm[1] = f64::NAN;
        assert!(matches!(request.run(), Err(SimError::Offset { .. })));

        request.offsets_ppm.clear();
        assert!(request.run().is_err());
    }
}
