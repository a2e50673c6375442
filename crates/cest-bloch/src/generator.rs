//! Continuous-time Bloch-McConnell generator `dM/dt = A·M + b`.

use cest_core::{CestResult, ensure_finite};
use nalgebra::{DMatrix, DVector};

use crate::error::BlochResult;
use crate::network::ExchangeNetwork;

/// RF carrier parameters shared by every pool of a network.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Irradiation {
    /// Larmor angular frequency of the static field (rad/s).
    pub w0: f64,
    /// Offset of the saturation carrier (ppm).
    pub delta_w_rf: f64,
}

impl Irradiation {
    pub fn new(w0: f64, delta_w_rf: f64) -> Self {
        Self { w0, delta_w_rf }
    }

    /// Alternate parameterization: static field given as a frequency in Hz.
    pub fn from_b0_hz(b0_hz: f64, delta_w_rf: f64) -> Self {
        Self::new(std::f64::consts::TAU * b0_hz, delta_w_rf)
    }

    /// Account for a B0 inhomogeneity of `shift` ppm.
    ///
    /// Every pool resonance moves by `+shift`, which is the same as moving the
    /// carrier by `-shift`.
    pub fn with_b0_shift(self, shift: f64) -> Self {
        Self {
            delta_w_rf: self.delta_w_rf - shift,
            ..self
        }
    }

    /// Angular frequency of the RF carrier, `w0·(1 + delta_w_rf·1e-6)`.
    pub fn carrier(&self) -> f64 {
        self.w0 * (1.0 + self.delta_w_rf * 1e-6)
    }

    /// Resonance of a pool at `delta_w` ppm relative to the carrier (rad/s).
    ///
    /// Equal to `w0·(1 + delta_w·1e-6) - carrier()`, computed without the
    /// cancellation of the two large terms.
    pub fn offset_of(&self, delta_w: f64) -> f64 {
        self.w0 * (delta_w - self.delta_w_rf) * 1e-6
    }

    fn validate(&self) -> CestResult<()> {
        ensure_finite(self.w0, "w0")?;
        ensure_finite(self.delta_w_rf, "RF offset")?;
        Ok(())
    }
}

/// Generator matrix `A` and constant forcing `b` for one RF amplitude.
///
/// Rows and columns are (Mx, My, Mz) per pool in pool order. `b` is zero except
/// for `R1·M0` in each pool's Mz slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Generator {
    a: DMatrix<f64>,
    b: DVector<f64>,
}

impl Generator {
    /// Assemble the generator for `network` under a carrier of amplitude `w1`.
    pub fn build(network: &ExchangeNetwork, irradiation: &Irradiation, w1: f64) -> BlochResult<Self> {
        irradiation.validate()?;
        ensure_finite(w1, "w1")?;

        let dim = network.reduced_dim();
        let mut a = DMatrix::zeros(dim, dim);
        let mut b = DVector::zeros(dim);

        for (i, species) in network.pools().iter().enumerate() {
            let o = 3 * i;
            let outflow = network.outflow_rate(i);
            let k1 = species.r1() + outflow;
            let k2 = species.r2() + outflow;
            let dw = irradiation.offset_of(network.resonance_offset(i));

            // Relaxation + precession
            a[(o, o)] = -k2;
            a[(o, o + 1)] = -dw;
            a[(o + 1, o)] = dw;
            a[(o + 1, o + 1)] = -k2;
            a[(o + 2, o + 2)] = -k1;

            // RF saturation (B1 along x)
            a[(o + 1, o + 2)] = -w1;
            a[(o + 2, o + 1)] = w1;

            b[o + 2] = species.r1() * species.m0();
        }

        for edge in network.edges() {
            let forward = edge.rate;
            let reverse = network.reverse_rate(edge);
            let (from, into) = (3 * edge.from, 3 * edge.into);
            for axis in 0..3 {
                a[(into + axis, from + axis)] += forward;
                a[(from + axis, into + axis)] += reverse;
            }
        }

        Ok(Self { a, b })
    }

    pub fn dim(&self) -> usize {
        self.b.len()
    }

    /// The matrix `A`.
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.a
    }

    /// The forcing vector `b`.
    pub fn forcing(&self) -> &DVector<f64> {
        &self.b
    }

    /// Augmented `(n+1)×(n+1)` generator acting on `[M, 1]`.
    ///
    /// The last row is zero; the last column holds `b`.
    pub fn projective(&self) -> DMatrix<f64> {
        let n = self.dim();
        let mut p = DMatrix::zeros(n + 1, n + 1);
        p.view_mut((0, 0), (n, n)).copy_from(&self.a);
        p.view_mut((0, n), (n, 1)).copy_from(&self.b);
        p
    }
}
