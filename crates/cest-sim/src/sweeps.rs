//! RF offset sweeps.

use std::fmt;

use crate::error::{SimError, SimResult};

/// Linearly spaced RF offsets (ppm), endpoints included.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetSweep {
    start_ppm: f64,
    end_ppm: f64,
    num_points: usize,
}

impl OffsetSweep {
    pub fn linear(start_ppm: f64, end_ppm: f64, num_points: usize) -> SimResult<Self> {
        if !(start_ppm.is_finite() && end_ppm.is_finite()) {
            return Err(SimError::InvalidArg {
                what: "sweep bounds must be finite",
            });
        }
        if num_points < 2 {
            return Err(SimError::InvalidArg {
                what: "sweep must have at least 2 points",
            });
        }
        if (start_ppm - end_ppm).abs() < 1e-12 {
            return Err(SimError::InvalidArg {
                what: "sweep start and end must be different",
            });
        }
        Ok(Self {
            start_ppm,
            end_ppm,
            num_points,
        })
    }

    /// Sweep from `-max_ppm` to `+max_ppm`, mirrored around 0.
    pub fn symmetric(max_ppm: f64, num_points: usize) -> SimResult<Self> {
        Self::linear(-max_ppm.abs(), max_ppm.abs(), num_points)
    }

    pub fn start_ppm(&self) -> f64 {
        self.start_ppm
    }

    pub fn end_ppm(&self) -> f64 {
        self.end_ppm
    }

    pub fn num_points(&self) -> usize {
        self.num_points
    }

    /// Offsets in sweep order. A sweep with `start == -end` is mirrored exactly,
    /// with the center of an odd-length sweep at 0.
    pub fn points(&self) -> Vec<f64> {
        let n = self.num_points;
        let delta = (self.end_ppm - self.start_ppm) / (n - 1) as f64;
        let mut points: Vec<f64> = (0..n).map(|i| self.start_ppm + i as f64 * delta).collect();

        // Ensure exact endpoint
        points[n - 1] = self.end_ppm;

        if self.start_ppm == -self.end_ppm {
            for i in 0..n / 2 {
                points[n - 1 - i] = -points[i];
            }
            if n % 2 == 1 {
                points[n / 2] = 0.0;
            }
        }
        points
    }
}

impl fmt::Display for OffsetSweep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Offsets {} to {} ppm ({} points)",
            self.start_ppm, self.end_ppm, self.num_points
        )
    }
}
