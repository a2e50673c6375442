//! Scenario schema definitions.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub version: u32,
    pub name: String,
    pub field: FieldDef,
    /// The first pool is the bulk (water) pool; the others exchange with it.
    pub pools: Vec<PoolDef>,
    #[serde(default, skip_serializing_if = "is_default")]
    pub third_pool_offset: ThirdPoolOffsetDef,
    pub saturation: SaturationDef,
    pub offsets: OffsetSweepDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtr: Option<NormalizationDef>,
}

/// Static field, given either in tesla or as the proton Larmor frequency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FieldDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b0_tesla: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub larmor_hz: Option<f64>,
    #[serde(default)]
    pub b0_shift_ppm: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PoolDef {
    pub id: String,
    pub kind: PoolKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum PoolKind {
    /// Bulk water with the catalog's relaxation times.
    Water,
    Explicit {
        t1_s: f64,
        t2_s: f64,
        offset_ppm: f64,
        m0: f64,
        /// Rate from this pool into the bulk pool. Ignored on the bulk pool.
        #[serde(default)]
        exchange_rate_hz: f64,
    },
    Catalog {
        metabolite: String,
        /// Multiplier applied to the catalog concentration.
        #[serde(default = "default_scale")]
        scale: f64,
    },
}

fn default_scale() -> f64 {
    1.0
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThirdPoolOffsetDef {
    #[default]
    Own,
    SecondPool,
}

fn is_default<T: Default + PartialEq>(v: &T) -> bool {
    *v == T::default()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum SaturationDef {
    ContinuousWave {
        b1_ut: f64,
        duration_s: f64,
    },
    Shaped {
        shape: PulseShapeDef,
        b1_ut: f64,
        pulse_duration_s: f64,
        step_s: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        train: Option<PulseTrainDef>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PulseShapeDef {
    Block,
    Gaussian {
        #[serde(default = "default_sigma")]
        sigma: f64,
        #[serde(default = "default_gaussian_x_max")]
        x_max: f64,
    },
    Sinc {
        #[serde(default = "default_side_lobes")]
        side_lobes: u32,
    },
    Sech {
        #[serde(default = "default_sech_x_max")]
        x_max: f64,
    },
}

fn default_sigma() -> f64 {
    1.0
}

fn default_gaussian_x_max() -> f64 {
    3.5
}

fn default_side_lobes() -> u32 {
    2
}

fn default_sech_x_max() -> f64 {
    10.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PulseTrainDef {
    pub count: usize,
    #[serde(default)]
    pub gap_s: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OffsetSweepDef {
    pub start_ppm: f64,
    pub end_ppm: f64,
    pub num_points: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NormalizationDef {
    Asym,
    NormRef,
    Pcm,
    Rex,
}
