use crate::CestError;

pub fn ensure_finite(v: f64, what: &'static str) -> Result<f64, CestError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CestError::NonFinite { what, value: v })
    }
}

/// Finite and strictly positive (relaxation times, equilibrium magnetizations, time steps).
pub fn ensure_positive(v: f64, what: &'static str) -> Result<f64, CestError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(CestError::NonPositive { what, value: v })
    }
}

/// Finite and `>= 0` (exchange rates, durations).
pub fn ensure_non_negative(v: f64, what: &'static str) -> Result<f64, CestError> {
    let v = ensure_finite(v, what)?;
    if v >= 0.0 {
        Ok(v)
    } else {
        Err(CestError::InvalidArg { what })
    }
}
