//! Physical parameters of one proton pool.

use crate::error::CestResult;
use crate::numeric::{ensure_finite, ensure_non_negative, ensure_positive};

/// A chemically distinct pool of protons.
///
/// Immutable once built: [`Species::new`] is the only way in, and it rejects
/// non-physical relaxation times and equilibrium magnetizations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Species {
    t1: f64,
    t2: f64,
    delta_w: f64,
    m0: f64,
}

impl Species {
    /// - `t1`, `t2`: relaxation times (s), > 0
    /// - `delta_w`: chemical shift (ppm)
    /// - `m0`: equilibrium longitudinal magnetization (unitless), > 0
    pub fn new(t1: f64, t2: f64, delta_w: f64, m0: f64) -> CestResult<Self> {
        Ok(Self {
            t1: ensure_positive(t1, "T1")?,
            t2: ensure_positive(t2, "T2")?,
            delta_w: ensure_finite(delta_w, "frequency offset")?,
            m0: ensure_positive(m0, "M0")?,
        })
    }

    pub fn t1(&self) -> f64 {
        self.t1
    }

    pub fn t2(&self) -> f64 {
        self.t2
    }

    /// Chemical shift in ppm.
    pub fn delta_w(&self) -> f64 {
        self.delta_w
    }

    pub fn m0(&self) -> f64 {
        self.m0
    }

    /// Longitudinal relaxation rate (Hz).
    pub fn r1(&self) -> f64 {
        1.0 / self.t1
    }

    /// Transverse relaxation rate (Hz).
    pub fn r2(&self) -> f64 {
        1.0 / self.t2
    }

    /// Copy with a different equilibrium magnetization.
    pub fn with_m0(&self, m0: f64) -> CestResult<Self> {
        Self::new(self.t1, self.t2, self.delta_w, m0)
    }
}

/// A minor pool that carries its own exchange rate toward the bulk pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabilePool {
    pub species: Species,
    /// Rate (Hz) from this pool into the bulk pool.
    pub exchange_rate: f64,
}

impl LabilePool {
    pub fn new(species: Species, exchange_rate: f64) -> CestResult<Self> {
        Ok(Self {
            species,
            exchange_rate: ensure_non_negative(exchange_rate, "exchange rate")?,
        })
    }
}
