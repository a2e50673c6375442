//! Magnetization transfer ratio (MTR) asymmetry of a Z-spectrum.
//!
//! The label value at `+Δω` is compared with the reference value at `-Δω`
//! (Zaiss et al., NMR Biomed 27(3), 2014, eqs. 7-10).

use std::fmt;

use crate::error::{SimError, SimResult};

/// Offsets closer than this (ppm) are treated as mirror images.
const MIRROR_TOL_PPM: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Normalization {
    /// `Zref - Zlab`
    Asym,
    /// `(Zref - Zlab) / Zref`
    #[default]
    NormRef,
    /// `(Zref - Zlab) / (Zref - Zlab + Zlab·Zref)`
    Pcm,
    /// `1/Zlab - 1/Zref`
    Rex,
}

impl Normalization {
    pub const ALL: [Normalization; 4] = [
        Normalization::Asym,
        Normalization::NormRef,
        Normalization::Pcm,
        Normalization::Rex,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Normalization::Asym => "asym",
            Normalization::NormRef => "normref",
            Normalization::Pcm => "pcm",
            Normalization::Rex => "rex",
        }
    }

    pub fn apply(&self, z_label: f64, z_reference: f64) -> f64 {
        let diff = z_reference - z_label;
        match self {
            Normalization::Asym => diff,
            Normalization::NormRef => diff / z_reference,
            Normalization::Pcm => diff / (diff + z_label * z_reference),
            Normalization::Rex => 1.0 / z_label - 1.0 / z_reference,
        }
    }
}

impl fmt::Display for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for Normalization {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asym" => Ok(Normalization::Asym),
            "normref" => Ok(Normalization::NormRef),
            "pcm" => Ok(Normalization::Pcm),
            "rex" => Ok(Normalization::Rex),
            _ => Err(SimError::InvalidArg {
                what: "unknown MTR normalization (expected asym, normref, pcm or rex)",
            }),
        }
    }
}

/// MTR values at the non-negative offsets, in ascending order.
#[derive(Debug, Clone, PartialEq)]
pub struct Mtr {
    pub normalization: Normalization,
    pub offsets_ppm: Vec<f64>,
    pub values: Vec<f64>,
}

/// MTR of spectrum `z` sampled at `offsets_ppm`.
///
/// Offsets may come in any order but must be mirrored around 0 ppm.
pub fn mtr(z: &[f64], offsets_ppm: &[f64], normalization: Normalization) -> SimResult<Mtr> {
    if z.len() != offsets_ppm.len() {
        return Err(SimError::InvalidArg {
            what: "Z-spectrum and offsets have different lengths",
        });
    }
    if offsets_ppm.iter().any(|v| !v.is_finite()) {
        return Err(SimError::InvalidArg {
            what: "offsets must be finite",
        });
    }

    // Rounding can leave the center a hair off 0; it must land on both sides.
    let mut samples: Vec<(f64, f64)> = offsets_ppm
        .iter()
        .map(|&ppm| if ppm.abs() <= MIRROR_TOL_PPM { 0.0 } else { ppm })
        .zip(z.iter().copied())
        .collect();
    samples.sort_by(|a, b| a.0.total_cmp(&b.0));

    let label: Vec<(f64, f64)> = samples.iter().copied().filter(|s| s.0 >= 0.0).collect();
    let reference: Vec<(f64, f64)> = samples
        .iter()
        .rev()
        .copied()
        .filter(|s| s.0 <= 0.0)
        .collect();

    if label.len() != reference.len() {
        return Err(SimError::Asymmetric {
            what: format!(
                "{} non-negative vs {} non-positive offsets",
                label.len(),
                reference.len()
            ),
        });
    }
    if label.is_empty() {
        return Err(SimError::InvalidArg {
            what: "Z-spectrum is empty",
        });
    }

    let mut out = Mtr {
        normalization,
        offsets_ppm: Vec::with_capacity(label.len()),
        values: Vec::with_capacity(label.len()),
    };
    for (&(lab_ppm, lab_z), &(ref_ppm, ref_z)) in label.iter().zip(&reference) {
        if (lab_ppm + ref_ppm).abs() > MIRROR_TOL_PPM {
            return Err(SimError::Asymmetric {
                what: format!("{lab_ppm} ppm has no mirror (nearest {ref_ppm} ppm)"),
            });
        }
        out.offsets_ppm.push(lab_ppm);
        out.values.push(normalization.apply(lab_z, ref_z));
    }
    Ok(out)
}
