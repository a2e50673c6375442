//! Discrete-time propagators: projective (augmented) and reduced (affine) forms.
//!
//! Both are closed-form solutions of `dM/dt = A·M + b` over a fixed duration with
//! constant RF amplitude:
//! - projective: `[M(t), 1] = exp(t·P)·[M(0), 1]` with `P` the augmented generator
//! - reduced: `M(t) = exp(t·A)·(M(0) − M_ss) + M_ss`, where `A·M_ss + b = 0`

use cest_core::{CestError, ensure_non_negative};
use nalgebra::{DMatrix, DVector};

use crate::error::{BlochError, BlochResult};
use crate::generator::{Generator, Irradiation};
use crate::network::ExchangeNetwork;

/// Relative residual accepted from the steady-state solve.
const STEADY_STATE_RESIDUAL_TOL: f64 = 1e-9;

/// Exponential of the augmented generator scaled by `duration`.
pub fn propagator(generator: &Generator, duration: f64) -> BlochResult<DMatrix<f64>> {
    ensure_non_negative(duration, "duration")?;
    let p = (generator.projective() * duration).exp();
    ensure_all_finite(p.iter(), "propagator")?;
    Ok(p)
}

/// Solve `A·x + b = 0` with a partially pivoted LU factorization.
///
/// Fails with [`BlochError::SingularGenerator`] when the factorization breaks
/// down, a pivot is negligible relative to the largest one, or the solution does
/// not satisfy the system to within a relative residual of 1e-9.
pub fn steady_state(a: &DMatrix<f64>, b: &DVector<f64>) -> BlochResult<DVector<f64>> {
    if !a.is_square() || a.nrows() != b.len() {
        return Err(CestError::DimensionMismatch {
            what: "steady-state system",
            expected: a.nrows(),
            actual: b.len(),
        }
        .into());
    }

    let lu = a.clone().lu();
    let pivots = lu.u().diagonal();
    let (largest, smallest) = (pivots.amax(), pivots.amin());
    if !(smallest > largest * f64::EPSILON * a.nrows() as f64) {
        return Err(BlochError::SingularGenerator {
            what: format!(
                "pivot ratio {:.3e} below working precision",
                smallest / largest
            ),
        });
    }

    let x = lu
        .solve(&(-b))
        .ok_or_else(|| BlochError::SingularGenerator {
            what: "LU solve failed".to_string(),
        })?;
    ensure_all_finite(x.iter(), "steady state")?;

    let residual = (a * &x + b).norm();
    let scale = a.norm() * x.norm() + b.norm();
    if residual > STEADY_STATE_RESIDUAL_TOL * scale {
        return Err(BlochError::SingularGenerator {
            what: format!(
                "steady-state residual {:.3e} exceeds tolerance (scale {:.3e})",
                residual, scale
            ),
        });
    }

    Ok(x)
}

/// Advance a reduced state by `duration` under a fixed generator.
pub fn evolve_reduced(
    generator: &Generator,
    duration: f64,
    state: &DVector<f64>,
) -> BlochResult<DVector<f64>> {
    ensure_non_negative(duration, "duration")?;
    check_len(state.len(), generator.dim(), "reduced state")?;

    let m_ss = steady_state(generator.matrix(), generator.forcing())?;
    let transition = (generator.matrix() * duration).exp();
    let next = transition * (state - &m_ss) + m_ss;
    ensure_all_finite(next.iter(), "evolved state")?;
    Ok(next)
}

/// Projective propagator for a network.
pub fn build_propagator(
    network: &ExchangeNetwork,
    irradiation: &Irradiation,
    w1: f64,
    duration: f64,
) -> BlochResult<DMatrix<f64>> {
    let generator = Generator::build(network, irradiation, w1)?;
    propagator(&generator, duration)
}

/// One reduced-form step for a network.
pub fn evolve(
    network: &ExchangeNetwork,
    irradiation: &Irradiation,
    w1: f64,
    duration: f64,
    state: &DVector<f64>,
) -> BlochResult<DVector<f64>> {
    check_len(state.len(), network.reduced_dim(), "reduced state")?;
    let generator = Generator::build(network, irradiation, w1)?;
    evolve_reduced(&generator, duration, state)
}

pub(crate) fn check_len(actual: usize, expected: usize, what: &'static str) -> BlochResult<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(CestError::DimensionMismatch {
            what,
            expected,
            actual,
        }
        .into())
    }
}

fn ensure_all_finite<'a>(
    mut values: impl Iterator<Item = &'a f64>,
    what: &'static str,
) -> BlochResult<()> {
    if values.all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(BlochError::NonFiniteResult { what })
    }
}
