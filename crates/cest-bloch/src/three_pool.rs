//! Partial three-pool model: a bulk pool A exchanging independently with two
//! minor pools B and C. B and C do not exchange with each other.
//!
//! State layout: `[Mxa, Mya, Mza, Mxb, Myb, Mzb, Mxc, Myc, Mzc]`, with a trailing
//! `1` in projective coordinates.

use cest_core::{Species, ensure_non_negative};
use nalgebra::{DVector, SMatrix, SVector};

use crate::error::BlochResult;
use crate::generator::{Generator, Irradiation};
use crate::network::{ExchangeNetwork, OffsetSource};
use crate::{propagator, stepper};

pub type Matrix10 = SMatrix<f64, 10, 10>;
pub type Vector9 = SVector<f64, 9>;
pub type Vector10 = SVector<f64, 10>;

/// Resonance offset used for pool C.
///
/// `SecondPool` reproduces the historical builder, which precessed pool C at pool
/// B's chemical shift. Keep it only to compare against results produced that way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThirdPoolOffset {
    #[default]
    Own,
    SecondPool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThreePoolPartial {
    pub a: Species,
    pub b: Species,
    pub c: Species,
    /// Exchange rate from B into A (Hz).
    pub cb: f64,
    /// Exchange rate from C into A (Hz).
    pub cc: f64,
    pub c_offset: ThirdPoolOffset,
}

impl ThreePoolPartial {
    pub fn new(a: Species, b: Species, c: Species, cb: f64, cc: f64) -> BlochResult<Self> {
        ensure_non_negative(cb, "Cb")?;
        ensure_non_negative(cc, "Cc")?;
        Ok(Self {
            a,
            b,
            c,
            cb,
            cc,
            c_offset: ThirdPoolOffset::Own,
        })
    }

    pub fn with_c_offset(self, c_offset: ThirdPoolOffset) -> Self {
        Self { c_offset, ..self }
    }

    pub fn network(&self) -> BlochResult<ExchangeNetwork> {
        let mut builder = ExchangeNetwork::builder();
        let a = builder.add_pool(self.a);
        let b = builder.add_pool(self.b);
        let c = builder.add_pool(self.c);
        builder.add_exchange(b, a, self.cb).add_exchange(c, a, self.cc);
        if self.c_offset == ThirdPoolOffset::SecondPool {
            builder.set_offset_source(c, OffsetSource::Pool(b));
        }
        builder.build()
    }

    pub fn equilibrium(&self) -> Vector9 {
        let mut m = Vector9::zeros();
        m[2] = self.a.m0();
        m[5] = self.b.m0();
        m[8] = self.c.m0();
        m
    }

    pub fn equilibrium_projective(&self) -> Vector10 {
        Vector10::from_iterator(self.equilibrium().iter().copied().chain([1.0]))
    }

    /// Magnetization at which `dM/dt = 0` under a constant amplitude `w1`.
    pub fn steady_state(&self, irradiation: &Irradiation, w1: f64) -> BlochResult<Vector9> {
        let generator = Generator::build(&self.network()?, irradiation, w1)?;
        let m = propagator::steady_state(generator.matrix(), generator.forcing())?;
        Ok(Vector9::from_iterator(m.iter().copied()))
    }

    /// 10×10 transition matrix acting on the projective state.
    pub fn build_propagator(
        &self,
        irradiation: &Irradiation,
        w1: f64,
        duration: f64,
    ) -> BlochResult<Matrix10> {
        let p = propagator::build_propagator(&self.network()?, irradiation, w1, duration)?;
        Ok(Matrix10::from_iterator(p.iter().copied()))
    }

    pub fn evolve(
        &self,
        irradiation: &Irradiation,
        w1: f64,
        duration: f64,
        state: &Vector9,
    ) -> BlochResult<Vector9> {
        let m = propagator::evolve(
            &self.network()?,
            irradiation,
            w1,
            duration,
            &DVector::from_column_slice(state.as_slice()),
        )?;
        Ok(Vector9::from_iterator(m.iter().copied()))
    }

    pub fn evolve_shaped_projective(
        &self,
        irradiation: &Irradiation,
        amplitudes: &[f64],
        step: f64,
        initial: &Vector10,
    ) -> BlochResult<Vector10> {
        let m = stepper::evolve_shaped_projective(
            &self.network()?,
            irradiation,
            amplitudes,
            step,
            &DVector::from_column_slice(initial.as_slice()),
        )?;
        Ok(Vector10::from_iterator(m.iter().copied()))
    }

    pub fn evolve_shaped(
        &self,
        irradiation: &Irradiation,
        amplitudes: &[f64],
        step: f64,
        initial: &Vector9,
    ) -> BlochResult<Vector9> {
        let m = stepper::evolve_shaped(
            &self.network()?,
            irradiation,
            amplitudes,
            step,
            &DVector::from_column_slice(initial.as_slice()),
        )?;
        Ok(Vector9::from_iterator(m.iter().copied()))
    }
}
