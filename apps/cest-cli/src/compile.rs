//! Scenario definitions to runtime simulation types.

use cest_bloch::ThirdPoolOffset;
use cest_core::constants::{GAMMA_H_RAD_PER_S_PER_T, angular};
use cest_core::{Field, LabilePool, Species, hz, microtesla, s, tesla};
use cest_project::{
    FieldDef, NormalizationDef, PoolDef, PoolKind, PulseShapeDef, SaturationDef, Scenario,
    ThirdPoolOffsetDef,
};
use cest_sim::{
    Metabolite, Normalization, OffsetSweep, PoolModel, PulseShape, Saturation, SimError,
    ZSpectrumRequest,
};

use crate::error::{CliError, CliResult};

/// A scenario ready to run.
#[derive(Debug, Clone)]
pub struct CompiledScenario {
    pub name: String,
    pub request: ZSpectrumRequest,
    pub mtr: Option<Normalization>,
}

pub fn compile_scenario(scenario: &Scenario) -> CliResult<CompiledScenario> {
    let (bulk_def, labile_defs) = scenario
        .pools
        .split_first()
        .ok_or_else(|| CliError::Compile("scenario has no pools".to_string()))?;

    let bulk = compile_bulk(bulk_def)?;
    let labile = labile_defs
        .iter()
        .map(compile_labile)
        .collect::<CliResult<Vec<_>>>()?;

    let model = PoolModel::from_pools(bulk, &labile)?
        .with_third_pool_offset(compile_third_pool_offset(scenario.third_pool_offset));

    let sweep = OffsetSweep::linear(
        scenario.offsets.start_ppm,
        scenario.offsets.end_ppm,
        scenario.offsets.num_points,
    )?;

    let request = ZSpectrumRequest::new(
        model,
        compile_field(&scenario.field)?,
        compile_saturation(&scenario.saturation),
        &sweep,
    )
    .with_b0_shift(scenario.field.b0_shift_ppm);

    Ok(CompiledScenario {
        name: scenario.name.clone(),
        request,
        mtr: scenario.mtr.map(compile_normalization),
    })
}

fn compile_field(field: &FieldDef) -> CliResult<Field> {
    match (field.b0_tesla, field.larmor_hz) {
        (Some(b0), None) => Ok(tesla(b0)),
        (None, Some(f0)) => Ok(tesla(angular(hz(f0)) / GAMMA_H_RAD_PER_S_PER_T)),
        _ => Err(CliError::Compile(
            "field needs exactly one of b0_tesla and larmor_hz".to_string(),
        )),
    }
}

fn compile_bulk(pool: &PoolDef) -> CliResult<Species> {
    match &pool.kind {
        PoolKind::Water => Ok(cest_sim::water()?),
        PoolKind::Explicit {
            t1_s,
            t2_s,
            offset_ppm,
            m0,
            ..
        } => Ok(Species::new(*t1_s, *t2_s, *offset_ppm, *m0).map_err(SimError::from)?),
        PoolKind::Catalog { metabolite, .. } => Err(CliError::Compile(format!(
            "bulk pool '{}' cannot be the catalog metabolite '{}'",
            pool.id, metabolite
        ))),
    }
}

fn compile_labile(pool: &PoolDef) -> CliResult<LabilePool> {
    match &pool.kind {
        PoolKind::Water => Err(CliError::Compile(format!(
            "pool '{}': water can only be the bulk pool",
            pool.id
        ))),
        PoolKind::Explicit {
            t1_s,
            t2_s,
            offset_ppm,
            m0,
            exchange_rate_hz,
        } => {
            let species = Species::new(*t1_s, *t2_s, *offset_ppm, *m0).map_err(SimError::from)?;
            Ok(LabilePool::new(species, *exchange_rate_hz).map_err(SimError::from)?)
        }
        PoolKind::Catalog { metabolite, scale } => {
            let metabolite: Metabolite = metabolite.parse()?;
            Ok(metabolite.scaled_labile_pool(*scale)?)
        }
    }
}

fn compile_saturation(def: &SaturationDef) -> Saturation {
    match def {
        SaturationDef::ContinuousWave { b1_ut, duration_s } => {
            Saturation::continuous_wave(microtesla(*b1_ut), s(*duration_s))
        }
        SaturationDef::Shaped {
            shape,
            b1_ut,
            pulse_duration_s,
            step_s,
            train,
        } => {
            let saturation = Saturation::shaped(
                compile_shape(shape),
                microtesla(*b1_ut),
                s(*pulse_duration_s),
                s(*step_s),
            );
            match train {
                Some(train) => saturation.with_train(train.count, s(train.gap_s)),
                None => saturation,
            }
        }
    }
}

fn compile_shape(def: &PulseShapeDef) -> PulseShape {
    match *def {
        PulseShapeDef::Block => PulseShape::Block,
        PulseShapeDef::Gaussian { sigma, x_max } => PulseShape::Gaussian { sigma, x_max },
        PulseShapeDef::Sinc { side_lobes } => PulseShape::Sinc { side_lobes },
        PulseShapeDef::Sech { x_max } => PulseShape::Sech { x_max },
    }
}

fn compile_third_pool_offset(def: ThirdPoolOffsetDef) -> ThirdPoolOffset {
    match def {
        ThirdPoolOffsetDef::Own => ThirdPoolOffset::Own,
        ThirdPoolOffsetDef::SecondPool => ThirdPoolOffset::SecondPool,
    }
}

fn compile_normalization(def: NormalizationDef) -> Normalization {
    match def {
        NormalizationDef::Asym => Normalization::Asym,
        NormalizationDef::NormRef => Normalization::NormRef,
        NormalizationDef::Pcm => Normalization::Pcm,
        NormalizationDef::Rex => Normalization::Rex,
    }
}
