//! Shaped-pulse stepper: a strict left fold of the propagator over RF samples.

use cest_core::{CestError, ensure_positive};
use nalgebra::DVector;
use tracing::{debug, trace};

use crate::error::{BlochError, BlochResult};
use crate::generator::{Generator, Irradiation};
use crate::network::ExchangeNetwork;
use crate::propagator::{check_len, evolve_reduced, propagator};

/// Largest accepted deviation of the projective constant channel from 1.
const CONSTANT_CHANNEL_TOL: f64 = 1e-12;

/// Evolve a projective state `[M, 1]` through a shaped pulse.
///
/// Each amplitude sample is held for `step` seconds; samples are consumed in order.
pub fn evolve_shaped_projective(
    network: &ExchangeNetwork,
    irradiation: &Irradiation,
    amplitudes: &[f64],
    step: f64,
    initial: &DVector<f64>,
) -> BlochResult<DVector<f64>> {
    check_pulse(amplitudes, step)?;
    check_len(initial.len(), network.projective_dim(), "projective state")?;
    if (initial[initial.len() - 1] - 1.0).abs() > CONSTANT_CHANNEL_TOL {
        return Err(CestError::InvalidArg {
            what: "projective state must end with a constant 1",
        }
        .into());
    }

    debug!(
        samples = amplitudes.len(),
        step,
        dim = initial.len(),
        "evolving shaped pulse (projective)"
    );
    amplitudes
        .iter()
        .enumerate()
        .try_fold(initial.clone(), |m, (i, &w1)| {
            trace!(sample = i, w1, "projective step");
            let generator = Generator::build(network, irradiation, w1)?;
            Ok(propagator(&generator, step)? * m)
        })
}

/// Evolve a reduced state `M` through a shaped pulse.
pub fn evolve_shaped(
    network: &ExchangeNetwork,
    irradiation: &Irradiation,
    amplitudes: &[f64],
    step: f64,
    initial: &DVector<f64>,
) -> BlochResult<DVector<f64>> {
    check_pulse(amplitudes, step)?;
    check_len(initial.len(), network.reduced_dim(), "reduced state")?;

    debug!(
        samples = amplitudes.len(),
        step,
        dim = initial.len(),
        "evolving shaped pulse (reduced)"
    );
    amplitudes
        .iter()
        .enumerate()
        .try_fold(initial.clone(), |m, (i, &w1)| {
            trace!(sample = i, w1, "reduced step");
            let generator = Generator::build(network, irradiation, w1)?;
            evolve_reduced(&generator, step, &m)
        })
}

fn check_pulse(amplitudes: &[f64], step: f64) -> BlochResult<()> {
    if amplitudes.is_empty() {
        return Err(BlochError::EmptyPulse);
    }
    ensure_positive(step, "step")?;
    Ok(())
}
