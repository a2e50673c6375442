//! Scenario validation logic.

use crate::schema::{
    FieldDef, OffsetSweepDef, PoolDef, PoolKind, PulseShapeDef, SaturationDef, Scenario,
};
use cest_sim::{MAX_PULSE_SAMPLES, Metabolite};
use std::collections::HashSet;

pub const LATEST_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported feature: {feature} - {reason}")]
    Unsupported { feature: String, reason: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_scenario(scenario: &Scenario) -> Result<(), ValidationError> {
    if scenario.version == 0 || scenario.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: scenario.version,
        });
    }

    validate_field(&scenario.field)?;

    if !(2..=3).contains(&scenario.pools.len()) {
        return Err(ValidationError::Unsupported {
            feature: format!("{} pools", scenario.pools.len()),
            reason: "a scenario has one bulk pool and one or two exchanging pools".to_string(),
        });
    }
    let mut pool_ids = HashSet::new();
    for (i, pool) in scenario.pools.iter().enumerate() {
        if !pool_ids.insert(&pool.id) {
            return Err(ValidationError::DuplicateId {
                id: pool.id.clone(),
                context: "pools".to_string(),
            });
        }
        validate_pool(pool, i == 0)?;
    }

    validate_saturation(&scenario.saturation)?;
    validate_offsets(&scenario.offsets, scenario.mtr.is_some())?;
    Ok(())
}

fn validate_field(field: &FieldDef) -> Result<(), ValidationError> {
    match (field.b0_tesla, field.larmor_hz) {
        (Some(b0), None) => positive("field.b0_tesla", b0)?,
        (None, Some(hz)) => positive("field.larmor_hz", hz)?,
        (b0, hz) => {
            return Err(ValidationError::InvalidValue {
                field: "field".to_string(),
                value: format!("b0_tesla={b0:?}, larmor_hz={hz:?}"),
                reason: "give exactly one of b0_tesla and larmor_hz".to_string(),
            });
        }
    }
    finite("field.b0_shift_ppm", field.b0_shift_ppm)
}

fn validate_pool(pool: &PoolDef, is_bulk: bool) -> Result<(), ValidationError> {
    let prefix = format!("pools.{}", pool.id);
    match &pool.kind {
        PoolKind::Water => Ok(()),
        PoolKind::Explicit {
            t1_s,
            t2_s,
            offset_ppm,
            m0,
            exchange_rate_hz,
        } => {
            positive(&format!("{prefix}.t1_s"), *t1_s)?;
            positive(&format!("{prefix}.t2_s"), *t2_s)?;
            finite(&format!("{prefix}.offset_ppm"), *offset_ppm)?;
            positive(&format!("{prefix}.m0"), *m0)?;
            if is_bulk {
                if *exchange_rate_hz != 0.0 {
                    return Err(ValidationError::InvalidValue {
                        field: format!("{prefix}.exchange_rate_hz"),
                        value: exchange_rate_hz.to_string(),
                        reason: "the bulk pool's rates follow from the other pools".to_string(),
                    });
                }
                Ok(())
            } else {
                non_negative(&format!("{prefix}.exchange_rate_hz"), *exchange_rate_hz)
            }
        }
        PoolKind::Catalog { metabolite, scale } => {
            if is_bulk {
                return Err(ValidationError::Unsupported {
                    feature: format!("catalog bulk pool '{metabolite}'"),
                    reason: "the bulk pool must be Water or Explicit".to_string(),
                });
            }
            if metabolite.parse::<Metabolite>().is_err() {
                return Err(ValidationError::MissingReference {
                    id: metabolite.clone(),
                    context: format!("{prefix} metabolite catalog"),
                });
            }
            positive(&format!("{prefix}.scale"), *scale)
        }
    }
}

fn validate_saturation(saturation: &SaturationDef) -> Result<(), ValidationError> {
    match saturation {
        SaturationDef::ContinuousWave { b1_ut, duration_s } => {
            finite("saturation.b1_ut", *b1_ut)?;
            non_negative("saturation.duration_s", *duration_s)
        }
        SaturationDef::Shaped {
            shape,
            b1_ut,
            pulse_duration_s,
            step_s,
            train,
        } => {
            finite("saturation.b1_ut", *b1_ut)?;
            positive("saturation.step_s", *step_s)?;
            positive("saturation.pulse_duration_s", *pulse_duration_s)?;
            let pulse_steps = (pulse_duration_s / step_s).round();
            if pulse_steps < 1.0 {
                return Err(ValidationError::InvalidValue {
                    field: "saturation.pulse_duration_s".to_string(),
                    value: pulse_duration_s.to_string(),
                    reason: "shorter than one sample step".to_string(),
                });
            }
            match shape {
                PulseShapeDef::Gaussian { sigma, x_max } => {
                    positive("saturation.shape.sigma", *sigma)?;
                    positive("saturation.shape.x_max", *x_max)?;
                }
                PulseShapeDef::Sech { x_max } => positive("saturation.shape.x_max", *x_max)?,
                PulseShapeDef::Block | PulseShapeDef::Sinc { .. } => {}
            }
            if let Some(train) = train {
                if train.count == 0 {
                    return Err(ValidationError::InvalidValue {
                        field: "saturation.train.count".to_string(),
                        value: "0".to_string(),
                        reason: "must be at least 1".to_string(),
                    });
                }
                non_negative("saturation.train.gap_s", train.gap_s)?;
            }
            let total_steps = match train {
                Some(train) => {
                    let count = train.count as f64;
                    count * pulse_steps + (count - 1.0) * (train.gap_s / step_s).round()
                }
                None => pulse_steps,
            };
            if total_steps > MAX_PULSE_SAMPLES as f64 {
                return Err(ValidationError::InvalidValue {
                    field: "saturation".to_string(),
                    value: format!("{total_steps} samples"),
                    reason: format!("exceeds the limit of {MAX_PULSE_SAMPLES} samples"),
                });
            }
            Ok(())
        }
    }
}

fn validate_offsets(offsets: &OffsetSweepDef, needs_symmetry: bool) -> Result<(), ValidationError> {
    finite("offsets.start_ppm", offsets.start_ppm)?;
    finite("offsets.end_ppm", offsets.end_ppm)?;
    if offsets.num_points < 2 {
        return Err(ValidationError::InvalidValue {
            field: "offsets.num_points".to_string(),
            value: offsets.num_points.to_string(),
            reason: "sweep must have at least 2 points".to_string(),
        });
    }
    if offsets.start_ppm == offsets.end_ppm {
        return Err(ValidationError::InvalidValue {
            field: "offsets.end_ppm".to_string(),
            value: offsets.end_ppm.to_string(),
            reason: "start and end must be different".to_string(),
        });
    }
    if needs_symmetry && offsets.start_ppm != -offsets.end_ppm {
        return Err(ValidationError::InvalidValue {
            field: "offsets".to_string(),
            value: format!("{}..{}", offsets.start_ppm, offsets.end_ppm),
            reason: "MTR needs offsets mirrored around 0 ppm".to_string(),
        });
    }
    Ok(())
}

fn finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, value, "must be finite"))
    }
}

fn positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be positive"))
    }
}

fn non_negative(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be non-negative"))
    }
}

fn invalid(field: &str, value: f64, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
