//! Elementary numeric primitives backing the value domain.
//!
//! Every routine here has a defined domain and reports
//! [`ValueError::Domain`] outside it. The approximations themselves are
//! delegated to the standard library and, for the determinant, to
//! `nalgebra`'s LU decomposition.

use crate::value::ValueError;
use nalgebra::DMatrix;
use std::f64::consts::PI;

/// Defined for non-negative inputs.
pub fn sqrt(x: f64) -> Result<f64, ValueError> {
    if x < 0.0 {
        Err(ValueError::Domain)
    } else {
        Ok(x.sqrt())
    }
}

pub fn exp(x: f64) -> f64 { x.exp() }

/// Defined for strictly positive inputs.
pub fn ln(x: f64) -> Result<f64, ValueError> {
    if x > 0.0 {
        Ok(x.ln())
    } else {
        Err(ValueError::Domain)
    }
}

pub fn sin(x: f64) -> f64 { x.sin() }

pub fn cos(x: f64) -> f64 { x.cos() }

/// Fails at the poles, where the cosine vanishes.
pub fn tan(x: f64) -> Result<f64, ValueError> {
    let cosine = x.cos();
    if cosine == 0.0 {
        Err(ValueError::Domain)
    } else {
        Ok(x.sin() / cosine)
    }
}

/// Fails where the sine vanishes.
pub fn cot(x: f64) -> Result<f64, ValueError> {
    let sine = x.sin();
    if sine == 0.0 {
        Err(ValueError::Domain)
    } else {
        Ok(x.cos() / sine)
    }
}

pub fn atan(x: f64) -> f64 { x.atan() }

/// Defined everywhere except the origin.
pub fn atan2(y: f64, x: f64) -> Result<f64, ValueError> {
    if x == 0.0 && y == 0.0 {
        Err(ValueError::Domain)
    } else {
        Ok(y.atan2(x))
    }
}

pub fn deg_to_rad(x: f64) -> f64 { x * PI / 180.0 }

pub fn rad_to_deg(x: f64) -> f64 { x * 180.0 / PI }

/// Real power. A negative base is only defined for integral exponents.
pub fn pow(x: f64, y: f64) -> Result<f64, ValueError> {
    if x == 0.0 || x == 1.0 {
        return Ok(x);
    }
    if y == 0.0 {
        return Ok(1.0);
    }
    if y == y.trunc() || x > 0.0 {
        return Ok(x.powf(y));
    }
    Err(ValueError::Domain)
}

/// Determinant of an `n`×`n` matrix given in row-major order.
pub fn det(n: usize, cells: &[f64]) -> f64 {
    debug_assert_eq!(cells.len(), n * n);

    if n == 0 {
        return 1.0;
    }
    DMatrix::from_row_slice(n, n, cells).determinant()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domains_are_enforced() {
        assert_eq!(sqrt(-1.0), Err(ValueError::Domain));
        assert_eq!(ln(0.0), Err(ValueError::Domain));
        assert_eq!(ln(-3.0), Err(ValueError::Domain));
        assert_eq!(cot(0.0), Err(ValueError::Domain));
        assert_eq!(atan2(0.0, 0.0), Err(ValueError::Domain));
        assert_eq!(pow(-2.0, 0.5), Err(ValueError::Domain));
    }

    #[test]
    fn exact_inputs_give_exact_results() {
        assert_eq!(sqrt(4.0), Ok(2.0));
        assert_eq!(ln(1.0), Ok(0.0));
        assert_eq!(sin(0.0), 0.0);
        assert_eq!(cos(0.0), 1.0);
        assert_eq!(atan(0.0), 0.0);
        assert_eq!(pow(-2.0, 3.0), Ok(-8.0));
        assert_eq!(pow(2.0, 10.0), Ok(1024.0));
        // zero base short-circuits, even for negative exponents
        assert_eq!(pow(0.0, -1.0), Ok(0.0));
    }

    #[test]
    fn determinants() {
        assert_eq!(det(2, &[1.0, 2.0, 3.0, 4.0]), -2.0);
        assert_eq!(det(1, &[7.0]), 7.0);
        // the empty matrix has determinant one
        assert_eq!(det(0, &[]), 1.0);
    }
}
