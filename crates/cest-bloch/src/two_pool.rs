//! Two-pool model: a bulk pool A exchanging with one minor pool B.
//!
//! State layout: `[Mxa, Mya, Mza, Mxb, Myb, Mzb]`, with a trailing `1` in
//! projective coordinates.

use cest_core::{LabilePool, Species, ensure_non_negative};
use nalgebra::{DVector, SMatrix, SVector};

use crate::error::BlochResult;
use crate::generator::{Generator, Irradiation};
use crate::network::ExchangeNetwork;
use crate::{propagator, stepper};

pub type Matrix7 = SMatrix<f64, 7, 7>;
pub type Vector6 = SVector<f64, 6>;
pub type Vector7 = SVector<f64, 7>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoPool {
    pub a: Species,
    pub b: Species,
    /// Exchange rate from B into A (Hz).
    pub cb: f64,
}

impl TwoPool {
    pub fn new(a: Species, b: Species, cb: f64) -> BlochResult<Self> {
        ensure_non_negative(cb, "Cb")?;
        Ok(Self { a, b, cb })
    }

    /// Bulk pool plus a labile pool carrying its own exchange rate.
    pub fn from_labile(bulk: Species, labile: LabilePool) -> Self {
        Self {
            a: bulk,
            b: labile.species,
            cb: labile.exchange_rate,
        }
    }

    pub fn network(&self) -> BlochResult<ExchangeNetwork> {
        let mut builder = ExchangeNetwork::builder();
        let a = builder.add_pool(self.a);
        let b = builder.add_pool(self.b);
        builder.add_exchange(b, a, self.cb);
        builder.build()
    }

    pub fn equilibrium(&self) -> Vector6 {
        Vector6::new(0.0, 0.0, self.a.m0(), 0.0, 0.0, self.b.m0())
    }

    pub fn equilibrium_projective(&self) -> Vector7 {
        Vector7::from_iterator(self.equilibrium().iter().copied().chain([1.0]))
    }

    /// Magnetization at which `dM/dt = 0` under a constant amplitude `w1`.
    pub fn steady_state(&self, irradiation: &Irradiation, w1: f64) -> BlochResult<Vector6> {
        let generator = Generator::build(&self.network()?, irradiation, w1)?;
        let m = propagator::steady_state(generator.matrix(), generator.forcing())?;
        Ok(Vector6::from_iterator(m.iter().copied()))
    }

    /// 7×7 transition matrix acting on `[Mxa, Mya, Mza, Mxb, Myb, Mzb, 1]`.
    pub fn build_propagator(
        &self,
        irradiation: &Irradiation,
        w1: f64,
        duration: f64,
    ) -> BlochResult<Matrix7> {
        let p = propagator::build_propagator(&self.network()?, irradiation, w1, duration)?;
        Ok(Matrix7::from_iterator(p.iter().copied()))
    }

    /// Magnetization after `duration` seconds of saturation at amplitude `w1`.
    pub fn evolve(
        &self,
        irradiation: &Irradiation,
        w1: f64,
        duration: f64,
        state: &Vector6,
    ) -> BlochResult<Vector6> {
        let m = propagator::evolve(
            &self.network()?,
            irradiation,
            w1,
            duration,
            &DVector::from_column_slice(state.as_slice()),
        )?;
        Ok(Vector6::from_iterator(m.iter().copied()))
    }

    /// Shaped pulse in projective coordinates.
    pub fn evolve_shaped_projective(
        &self,
        irradiation: &Irradiation,
        amplitudes: &[f64],
        step: f64,
        initial: &Vector7,
    ) -> BlochResult<Vector7> {
        let m = stepper::evolve_shaped_projective(
            &self.network()?,
            irradiation,
            amplitudes,
            step,
            &DVector::from_column_slice(initial.as_slice()),
        )?;
        Ok(Vector7::from_iterator(m.iter().copied()))
    }

    /// Shaped pulse in reduced coordinates.
    pub fn evolve_shaped(
        &self,
        irradiation: &Irradiation,
        amplitudes: &[f64],
        step: f64,
        initial: &Vector6,
    ) -> BlochResult<Vector6> {
        let m = stepper::evolve_shaped(
            &self.network()?,
            irradiation,
            amplitudes,
            step,
            &DVector::from_column_slice(initial.as_slice()),
        )?;
        Ok(Vector6::from_iterator(m.iter().copied()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BlochError;
    use std::f64::consts::TAU;

    fn model(cb: f64) -> TwoPool {
        TwoPool::new(
            Species::new(1.0, 0.1, 0.0, 1.0).unwrap(),
            Species::new(1.0, 0.01, -3.0, 0.001).unwrap(),
            cb,
        )
        .unwrap()
    }

    #[test]
    fn rejects_negative_rate() {
        let m = model(0.0);
        assert!(matches!(
            TwoPool::new(m.a, m.b, -1.0),
            Err(BlochError::Core(_))
        ));
    }

    #[test]
    fn equilibrium_is_a_fixed_point_without_rf() {
        let m = model(20.0);
        let irr = Irradiation::new(TAU * 128e6, 5.0);
        let after = m.evolve(&irr, 0.0, 3.0, &m.equilibrium()).unwrap();
        assert!((after - m.equilibrium()).amax() < 1e-12);

        let ss = m.steady_state(&irr, 0.0).unwrap();
        assert!((ss - m.equilibrium()).amax() < 1e-12);
    }

    #[test]
    fn propagator_preserves_constant_channel() {
        let m = model(20.0);
        let irr = Irradiation::new(TAU * 128e6, -3.0);
        let p = m.build_propagator(&irr, TAU * 20.0, 0.5).unwrap();
        let row = p.row(6);
        for j in 0..6 {
            assert!(row[j].abs() < 1e-12);
        }
        assert!((row[6] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn labile_pool_carries_rate() {
        let m = model(0.0);
        let labile = LabilePool::new(m.b, 810.0).unwrap();
        let model = TwoPool::from_labile(m.a, labile);
        assert_eq!(model.cb, 810.0);
        assert_eq!(model.equilibrium_projective()[6], 1.0);
    }
}
