//! Library of RF pulse envelopes.
//!
//! Every shape is sampled on `steps` points of its support and normalized so the
//! samples sum to 1. Multiply by `γ·B1·steps` to get amplitudes (rad/s) whose mean
//! equals the continuous-wave amplitude `γ·B1`.

use std::f64::consts::PI;
use std::fmt;

use crate::error::{SimError, SimResult};

/// Upper bound on the samples of one pulse or train (80 MB of `f64`).
pub const MAX_PULSE_SAMPLES: usize = 10_000_000;

/// Shape of one RF pulse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PulseShape {
    /// Constant amplitude.
    Block,
    /// Gaussian of width `sigma` sampled on `[-x_max, x_max]`.
    Gaussian { sigma: f64, x_max: f64 },
    /// Normalized sinc with `side_lobes` lobes on each side of the main lobe.
    Sinc { side_lobes: u32 },
    /// Hyperbolic secant `1/cosh(x_max·x)` sampled on `[-1, 1]`.
    Sech { x_max: f64 },
}

impl PulseShape {
    pub const fn gaussian() -> Self {
        PulseShape::Gaussian {
            sigma: 1.0,
            x_max: 3.5,
        }
    }

    pub const fn sinc() -> Self {
        PulseShape::Sinc { side_lobes: 2 }
    }

    pub const fn sech() -> Self {
        PulseShape::Sech { x_max: 10.0 }
    }

    /// Sample the envelope on `steps` points, normalized to unit sum.
    pub fn samples(&self, steps: usize) -> SimResult<Vec<f64>> {
        if steps == 0 {
            return Err(SimError::InvalidArg {
                what: "pulse must have at least one step",
            });
        }
        if steps > MAX_PULSE_SAMPLES {
            return Err(too_many_samples());
        }
        let raw: Vec<f64> = match *self {
            PulseShape::Block => vec![1.0; steps],
            PulseShape::Gaussian { sigma, x_max } => {
                if !(sigma > 0.0 && sigma.is_finite()) {
                    return Err(SimError::InvalidArg {
                        what: "gaussian sigma must be positive",
                    });
                }
                let norm = sigma * (2.0 * PI).sqrt();
                linspace(-x_max, x_max, steps)
                    .map(|x| (-(x * x) / (2.0 * sigma * sigma)).exp() / norm)
                    .collect()
            }
            PulseShape::Sinc { side_lobes } => {
                let half = f64::from(side_lobes) + 1.0;
                linspace(-half, half, steps).map(normalized_sinc).collect()
            }
            PulseShape::Sech { x_max } => linspace(-1.0, 1.0, steps)
                .map(|x| 1.0 / (x_max * x).cosh())
                .collect(),
        };
        normalize(raw)
    }
}

impl fmt::Display for PulseShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Block => write!(f, "block"),
            Self::Gaussian { sigma, x_max } => write!(f, "gaussian(sigma={sigma}, x_max={x_max})"),
            Self::Sinc { side_lobes } => write!(f, "sinc(side_lobes={side_lobes})"),
            Self::Sech { x_max } => write!(f, "sech(x_max={x_max})"),
        }
    }
}

/// Repeat `pulse` `count` times with `gap_steps` zero samples between repetitions,
/// then renormalize to unit sum.
pub fn train(pulse: &[f64], count: usize, gap_steps: usize) -> SimResult<Vec<f64>> {
    if count == 0 {
        return Err(SimError::InvalidArg {
            what: "pulse train needs at least one pulse",
        });
    }
    if pulse.is_empty() {
        return Err(SimError::InvalidArg {
            what: "pulse must have at least one step",
        });
    }

    let total = count
        .checked_mul(pulse.len())
        .zip((count - 1).checked_mul(gap_steps))
        .and_then(|(pulses, gaps)| pulses.checked_add(gaps))
        .filter(|&n| n <= MAX_PULSE_SAMPLES)
        .ok_or_else(too_many_samples)?;

    let mut y = Vec::with_capacity(total);
    for i in 0..count {
        if i > 0 {
            y.extend(std::iter::repeat_n(0.0, gap_steps));
        }
        y.extend_from_slice(pulse);
    }
    normalize(y)
}

fn too_many_samples() -> SimError {
    SimError::InvalidArg {
        what: "pulse needs more samples than allowed",
    }
}

/// `sin(πx)/(πx)`, with the removable singularity filled in.
fn normalized_sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        let px = PI * x;
        px.sin() / px
    }
}

/// `n` evenly spaced points on `[start, end]`; a single point sits at `start`.
fn linspace(start: f64, end: f64, n: usize) -> impl Iterator<Item = f64> {
    let delta = if n > 1 {
        (end - start) / (n - 1) as f64
    } else {
        0.0
    };
    (0..n).map(move |i| {
        if n > 1 && i == n - 1 {
            end
        } else {
            start + i as f64 * delta
        }
    })
}

fn normalize(mut y: Vec<f64>) -> SimResult<Vec<f64>> {
    let sum: f64 = y.iter().sum();
    if !(sum > 0.0 && sum.is_finite()) {
        return Err(SimError::InvalidArg {
            what: "pulse envelope must have a positive, finite area",
        });
    }
    y.iter_mut().for_each(|v| *v /= sum);
    Ok(y)
}
