//! Saturation schemes: continuous-wave blocks and sampled shaped pulses.

use cest_core::constants::nutation;
use cest_core::{Field, Time, ensure_non_negative, ensure_positive, seconds};

use crate::error::{SimError, SimResult};
use crate::pulses::{MAX_PULSE_SAMPLES, PulseShape, train};

/// Repetition of a shaped pulse separated by free-precession gaps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseTrain {
    pub count: usize,
    pub gap: Time,
}

/// How the RF is applied before readout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Saturation {
    /// Constant amplitude `b1` for `duration`.
    ContinuousWave { b1: Field, duration: Time },
    /// `shape` sampled every `step` over `pulse_duration`, optionally repeated.
    ///
    /// `b1` is the CW-equivalent amplitude: the samples average to `γ·b1`.
    Shaped {
        shape: PulseShape,
        b1: Field,
        pulse_duration: Time,
        step: Time,
        train: Option<PulseTrain>,
    },
}

/// Saturation resolved into what the propagator consumes (rad/s, s).
#[derive(Debug, Clone, PartialEq)]
pub enum Drive {
    Constant { w1: f64, duration: f64 },
    Samples { amplitudes: Vec<f64>, step: f64 },
}

impl Drive {
    /// Total RF time (s).
    pub fn duration(&self) -> f64 {
        match self {
            Drive::Constant { duration, .. } => *duration,
            Drive::Samples { amplitudes, step } => amplitudes.len() as f64 * step,
        }
    }
}

impl Saturation {
    pub fn continuous_wave(b1: Field, duration: Time) -> Self {
        Saturation::ContinuousWave { b1, duration }
    }

    pub fn shaped(shape: PulseShape, b1: Field, pulse_duration: Time, step: Time) -> Self {
        Saturation::Shaped {
            shape,
            b1,
            pulse_duration,
            step,
            train: None,
        }
    }

    /// Repeat a shaped pulse; a no-op on continuous-wave saturation.
    pub fn with_train(self, count: usize, gap: Time) -> Self {
        match self {
            Saturation::Shaped {
                shape,
                b1,
                pulse_duration,
                step,
                ..
            } => Saturation::Shaped {
                shape,
                b1,
                pulse_duration,
                step,
                train: Some(PulseTrain { count, gap }),
            },
            cw => cw,
        }
    }

    /// CW-equivalent nutation frequency `γ·B1` (rad/s).
    pub fn w1(&self) -> f64 {
        match self {
            Saturation::ContinuousWave { b1, .. } | Saturation::Shaped { b1, .. } => nutation(*b1),
        }
    }

    /// Resolve into amplitudes and timing.
    pub fn drive(&self) -> SimResult<Drive> {
        match *self {
            Saturation::ContinuousWave { b1, duration } => Ok(Drive::Constant {
                w1: nutation(b1),
                duration: ensure_non_negative(seconds(duration), "saturation duration")?,
            }),
            Saturation::Shaped {
                shape,
                b1,
                pulse_duration,
                step,
                train: repeat,
            } => {
                let step = ensure_positive(seconds(step), "sample step")?;
                let steps = sample_count(seconds(pulse_duration), step)?;
                let mut envelope = shape.samples(steps)?;
                if let Some(PulseTrain { count, gap }) = repeat {
                    let gap = ensure_non_negative(seconds(gap), "train gap")?;
                    envelope = train(&envelope, count, gap_count(gap, step)?)?;
                }

                let scale = nutation(b1) * envelope.len() as f64;
                Ok(Drive::Samples {
                    amplitudes: envelope.into_iter().map(|v| v * scale).collect(),
                    step,
                })
            }
        }
    }
}

fn sample_count(duration: f64, step: f64) -> SimResult<usize> {
    let duration = ensure_non_negative(duration, "pulse duration")?;
    let steps = (duration / step).round();
    if steps < 1.0 {
        return Err(SimError::InvalidArg {
            what: "pulse duration is shorter than one sample step",
        });
    }
    if steps > MAX_PULSE_SAMPLES as f64 {
        return Err(SimError::InvalidArg {
            what: "pulse duration needs more samples than allowed",
        });
    }
    Ok(steps as usize)
}

fn gap_count(gap: f64, step: f64) -> SimResult<usize> {
    let steps = (gap / step).round();
    if steps > MAX_PULSE_SAMPLES as f64 {
        return Err(SimError::InvalidArg {
            what: "train gap needs more samples than allowed",
        });
    }
    Ok(steps as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cest_core::constants::GAMMA_H_RAD_PER_S_PER_T;
    use cest_core::{microtesla, ms, s};

    #[test]
    fn cw_resolves_to_constant_drive() {
        let sat = Saturation::continuous_wave(microtesla(6.0), s(1.0));
        let drive = sat.drive().unwrap();
        let Drive::Constant { w1, duration } = drive else {
            panic!("expected constant drive");
        };
        assert!((w1 - GAMMA_H_RAD_PER_S_PER_T * 6e-6).abs() < 1e-9);
        assert_eq!(duration, 1.0);
    }

    #[test]
    fn shaped_amplitudes_average_to_cw() {
        let sat = Saturation::shaped(PulseShape::gaussian(), microtesla(6.0), s(1.0), ms(1.0));
        let Drive::Samples { amplitudes, step } = sat.drive().unwrap() else {
            panic!("expected samples");
        };
        assert_eq!(amplitudes.len(), 1000);
        assert!((step - 1e-3).abs() < 1e-15);
        let mean = amplitudes.iter().sum::<f64>() / amplitudes.len() as f64;
        assert!((mean - sat.w1()).abs() < 1e-9 * sat.w1());
    }

    #[test]
    fn train_extends_duration() {
        let sat = Saturation::shaped(PulseShape::Block, microtesla(1.0), ms(10.0), ms(1.0))
            .with_train(3, ms(5.0));
        let drive = sat.drive().unwrap();
        assert!((drive.duration() - 0.040).abs() < 1e-12);
        let Drive::Samples { amplitudes, .. } = drive else {
            panic!("expected samples");
        };
        assert_eq!(amplitudes[10], 0.0);
        let mean = amplitudes.iter().sum::<f64>() / amplitudes.len() as f64;
        assert!((mean - sat.w1()).abs() < 1e-9 * sat.w1());
    }

    #[test]
    fn rejects_bad_timing() {
        let b1 = microtesla(1.0);
        assert!(Saturation::shaped(PulseShape::Block, b1, ms(1.0), s(0.0)).drive().is_err());
        assert!(Saturation::shaped(PulseShape::Block, b1, ms(0.1), ms(1.0)).drive().is_err());
        assert!(Saturation::continuous_wave(b1, s(-1.0)).drive().is_err());
        assert!(
            Saturation::shaped(PulseShape::Block, b1, ms(2.0), ms(1.0))
                .with_train(0, ms(1.0))
                .drive()
                .is_err()
        );
    }

    #[test]
    fn rejects_oversized_pulses() {
        let b1 = microtesla(1.0);
        assert!(matches!(
            Saturation::shaped(PulseShape::Block, b1, s(1e12), ms(1.0)).drive(),
            Err(SimError::InvalidArg { .. })
        ));
        assert!(
            Saturation::shaped(PulseShape::Block, b1, ms(10.0), ms(1.0))
                .with_train(usize::MAX, ms(1.0))
                .drive()
                .is_err()
        );
        assert!(
            Saturation::shaped(PulseShape::Block, b1, ms(10.0), ms(1.0))
                .with_train(2, s(1e12))
                .drive()
                .is_err()
        );
    }

    #[test]
    fn train_is_ignored_for_cw() {
        let cw = Saturation::continuous_wave(microtesla(1.0), s(2.0));
        assert_eq!(cw.with_train(4, ms(1.0)), cw);
    }
}
