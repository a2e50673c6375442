//! Catalog of brain metabolites with exchangeable protons.
//!
//! Relaxation times and exchange rates are literature values at 3 T. Equilibrium
//! magnetizations are relative to water: concentration (mM) over the 55 M proton
//! concentration of water.

use cest_core::{LabilePool, Species};
use std::fmt;

use crate::error::{SimError, SimResult};

/// Molar concentration of water (M).
pub const WATER_MOLARITY: f64 = 55.0;

/// Bulk water pool: T1 = 1.2 s, T2 = 40 ms, on resonance, M0 = 1.
pub fn water() -> SimResult<Species> {
    Ok(Species::new(1.2, 40e-3, 0.0, 1.0)?)
}

/// Equilibrium magnetization of a pool at `concentration_mm` relative to water.
pub fn relative_m0(concentration_mm: f64) -> f64 {
    concentration_mm / 1000.0 / WATER_MOLARITY
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metabolite {
    /// Myo-inositol hydroxyl protons (1 ppm)
    MyoInositol,
    /// Creatine guanidinium protons (2 ppm)
    Creatine,
    /// Phosphocreatine, 1.93 ppm resonance
    Phosphocreatine193,
    /// Phosphocreatine, 2.64 ppm resonance
    Phosphocreatine264,
    /// GABA amine protons
    Gaba,
    /// Taurine amine protons
    Taurine,
    /// Glutamate amine protons
    Glutamate,
    /// Glutamine, 2.15 ppm resonance
    Glutamine215,
    /// Glutamine, 2.87 ppm resonance
    Glutamine287,
    /// Glutamine, 3.18 ppm resonance
    Glutamine318,
    /// Mobile amide protons (APT)
    MobileAmides,
}

/// Literature parameters of one catalog entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetaboliteParams {
    pub t1: f64,
    pub t2: f64,
    pub offset_ppm: f64,
    /// Concentration of exchangeable protons (mM).
    pub concentration_mm: f64,
    /// Exchange rate toward water (Hz).
    pub exchange_rate: f64,
}

impl Metabolite {
    pub const ALL: [Metabolite; 11] = [
        Metabolite::MyoInositol,
        Metabolite::Creatine,
        Metabolite::Phosphocreatine193,
        Metabolite::Phosphocreatine264,
        Metabolite::Gaba,
        Metabolite::Taurine,
        Metabolite::Glutamate,
        Metabolite::Glutamine215,
        Metabolite::Glutamine287,
        Metabolite::Glutamine318,
        Metabolite::MobileAmides,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Metabolite::MyoInositol => "myo_inositol",
            Metabolite::Creatine => "creatine",
            Metabolite::Phosphocreatine193 => "phosphocreatine_1_93ppm",
            Metabolite::Phosphocreatine264 => "phosphocreatine_2_64ppm",
            Metabolite::Gaba => "gaba",
            Metabolite::Taurine => "taurine",
            Metabolite::Glutamate => "glutamate",
            Metabolite::Glutamine215 => "glutamine_2_15ppm",
            Metabolite::Glutamine287 => "glutamine_2_87ppm",
            Metabolite::Glutamine318 => "glutamine_3_18ppm",
            Metabolite::MobileAmides => "mobile_amides",
        }
    }

    pub fn params(&self) -> MetaboliteParams {
        let (t1, t2, offset_ppm, concentration_mm, exchange_rate) = match self {
            Metabolite::MyoInositol => (1.2, 22.8e-3, 1.0, 5.4, 2090.0),
            Metabolite::Creatine => (1.2, 7.1e-3, 2.0, 7.05, 810.0),
            Metabolite::Phosphocreatine193 => (1.2, 7.8e-3, 1.93, 7.05, 67.0),
            Metabolite::Phosphocreatine264 => (1.2, 7.8e-3, 2.64, 7.05, 126.0),
            Metabolite::Gaba => (1.2, 17.2e-3, 2.91, 1.5, 6900.0),
            Metabolite::Taurine => (1.2, 10e-3, 3.18, 1.55, 49600.0),
            Metabolite::Glutamate => (1.2, 6.9e-3, 3.2, 6.6, 7480.0),
            Metabolite::Glutamine215 => (1.2, 13.8e-3, 2.15, 3.0, 17.0),
            Metabolite::Glutamine287 => (1.2, 13.8e-3, 2.87, 3.0, 49.0),
            Metabolite::Glutamine318 => (1.2, 13.8e-3, 3.18, 3.0, 22880.0),
            Metabolite::MobileAmides => (1.2, 10e-3, 3.5, 72.0, 22.0),
        };
        MetaboliteParams {
            t1,
            t2,
            offset_ppm,
            concentration_mm,
            exchange_rate,
        }
    }

    pub fn species(&self) -> SimResult<Species> {
        let p = self.params();
        Ok(Species::new(
            p.t1,
            p.t2,
            p.offset_ppm,
            relative_m0(p.concentration_mm),
        )?)
    }

    /// The metabolite as a minor pool exchanging with water.
    pub fn labile_pool(&self) -> SimResult<LabilePool> {
        Ok(LabilePool::new(self.species()?, self.params().exchange_rate)?)
    }

    /// Same pool with its concentration scaled by `factor`.
    pub fn scaled_labile_pool(&self, factor: f64) -> SimResult<LabilePool> {
        let species = self.species()?;
        let scaled = species.with_m0(species.m0() * factor)?;
        Ok(LabilePool::new(scaled, self.params().exchange_rate)?)
    }
}

impl fmt::Display for Metabolite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for Metabolite {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' ', '.'], "_");
        match normalized.as_str() {
            "myo_inositol" | "myoinositol" | "mi" => Ok(Metabolite::MyoInositol),
            "creatine" | "cr" => Ok(Metabolite::Creatine),
            "phosphocreatine_1_93ppm" | "pcr_1_93" => Ok(Metabolite::Phosphocreatine193),
            "phosphocreatine_2_64ppm" | "pcr_2_64" => Ok(Metabolite::Phosphocreatine264),
            "gaba" => Ok(Metabolite::Gaba),
            "taurine" | "tau" => Ok(Metabolite::Taurine),
            "glutamate" | "glu" => Ok(Metabolite::Glutamate),
            "glutamine_2_15ppm" | "gln_2_15" => Ok(Metabolite::Glutamine215),
            "glutamine_2_87ppm" | "gln_2_87" => Ok(Metabolite::Glutamine287),
            "glutamine_3_18ppm" | "gln_3_18" => Ok(Metabolite::Glutamine318),
            "mobile_amides" | "amides" | "apt" => Ok(Metabolite::MobileAmides),
            _ => Err(SimError::UnknownMetabolite { key: s.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip() {
        for m in Metabolite::ALL {
            assert_eq!(m.key().parse::<Metabolite>().unwrap(), m);
        }
    }

    #[test]
    fn aliases_parse() {
        assert_eq!("Cr".parse::<Metabolite>().unwrap(), Metabolite::Creatine);
        assert_eq!("mobile-amides".parse::<Metabolite>().unwrap(), Metabolite::MobileAmides);
        assert!(matches!(
            "unobtainium".parse::<Metabolite>(),
            Err(SimError::UnknownMetabolite { .. })
        ));
    }

    #[test]
    fn creatine_parameters() {
        let pool = Metabolite::Creatine.labile_pool().unwrap();
        assert_eq!(pool.exchange_rate, 810.0);
        assert_eq!(pool.species.delta_w(), 2.0);
        assert!((pool.species.m0() - 0.00705 / 55.0).abs() < 1e-15);
        assert!((pool.species.t2() - 7.1e-3).abs() < 1e-15);
    }

    #[test]
    fn every_entry_builds() {
        for m in Metabolite::ALL {
            let pool = m.labile_pool().unwrap();
            assert!(pool.species.m0() < 2e-3, "{m}");
            assert!(pool.species.delta_w() > 0.0);
        }
        let w = water().unwrap();
        assert_eq!(w.m0(), 1.0);
        assert_eq!(w.delta_w(), 0.0);
    }

    #[test]
    fn scaled_pool_keeps_rate_and_offset() {
        let base = Metabolite::Glutamate.labile_pool().unwrap();
        let scaled = Metabolite::Glutamate.scaled_labile_pool(20.0).unwrap();
        assert!((scaled.species.m0() - 20.0 * base.species.m0()).abs() < 1e-15);
        assert_eq!(scaled.exchange_rate, base.exchange_rate);
        assert!(Metabolite::Glutamate.scaled_labile_pool(0.0).is_err());
    }
}
