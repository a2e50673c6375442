// cest-core/src/units.rs

use uom::si::f64::{
    Frequency as UomFrequency, MagneticFluxDensity as UomMagneticFluxDensity, Time as UomTime,
};

// Public canonical unit types (SI, f64)
pub type Field = UomMagneticFluxDensity;
pub type Frequency = UomFrequency;
pub type Time = UomTime;

#[inline]
pub fn tesla(v: f64) -> Field {
    use uom::si::magnetic_flux_density::tesla;
    Field::new::<tesla>(v)
}

#[inline]
pub fn microtesla(v: f64) -> Field {
    use uom::si::magnetic_flux_density::microtesla;
    Field::new::<microtesla>(v)
}

#[inline]
pub fn hz(v: f64) -> Frequency {
    use uom::si::frequency::hertz;
    Frequency::new::<hertz>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

#[inline]
pub fn ms(v: f64) -> Time {
    use uom::si::time::millisecond;
    Time::new::<millisecond>(v)
}

/// Value of a duration in seconds, the unit of the Bloch-McConnell core.
#[inline]
pub fn seconds(t: Time) -> f64 {
    use uom::si::time::second;
    t.get::<second>()
}

pub mod constants {
    use super::*;

    /// Proton gyromagnetic ratio (rad/s/T).
    pub const GAMMA_H_RAD_PER_S_PER_T: f64 = 267_522_187.44;

    /// Proton Larmor angular frequency (rad/s) in a static field.
    #[inline]
    pub fn larmor(b0: Field) -> f64 {
        use uom::si::magnetic_flux_density::tesla;
        GAMMA_H_RAD_PER_S_PER_T * b0.get::<tesla>()
    }

    /// Nutation angular frequency `w1 = γ·B1` (rad/s) of an RF field.
    #[inline]
    pub fn nutation(b1: Field) -> f64 {
        use uom::si::magnetic_flux_density::tesla;
        GAMMA_H_RAD_PER_S_PER_T * b1.get::<tesla>()
    }

    /// Angular frequency (rad/s) of a frequency given in Hz.
    #[inline]
    pub fn angular(f: Frequency) -> f64 {
        use uom::si::frequency::hertz;
        std::f64::consts::TAU * f.get::<hertz>()
    }
}

#[cfg(test)]
mod tests {
    use super::constants::*;
    use super::*;

    #[test]
    fn constructors_smoke() {
        let _b0 = tesla(3.0);
        let _b1 = microtesla(2.0);
        let _f = hz(128e6);
        let _t = s(2.0);
        let _tp = ms(100.0);
    }

    #[test]
    fn larmor_at_three_tesla() {
        let w0 = larmor(tesla(3.0));
        // ~127.7 MHz
        let f0 = w0 / std::f64::consts::TAU;
        assert!((f0 - 127.74e6).abs() < 0.1e6);
    }

    #[test]
    fn nutation_matches_gamma_times_b1() {
        let w1 = nutation(microtesla(1.0));
        assert!((w1 - GAMMA_H_RAD_PER_S_PER_T * 1e-6).abs() < 1e-9);
    }

    #[test]
    fn milliseconds_convert_to_seconds() {
        assert!((seconds(ms(250.0)) - 0.25).abs() < 1e-15);
        assert!((angular(hz(1.0)) - std::f64::consts::TAU).abs() < 1e-15);
    }
}
