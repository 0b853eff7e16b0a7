//! The tagged numeric value domain: complex scalars and real matrices.

use crate::{format, primitives};
use num_complex::Complex64;
use std::fmt::{self, Display, Formatter};

/// Errors raised by value-domain operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueError {
    /// The result is undefined for the given input.
    Domain,
    /// Operand kinds or shapes don't fit the requested operation.
    InvalidOperand,
}

impl Display for ValueError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ValueError::Domain => write!(f, "domain error"),
            ValueError::InvalidOperand => {
                write!(f, "operands mismatch operator")
            },
        }
    }
}

impl std::error::Error for ValueError {}

/// A dense row-major matrix of reals.
///
/// Writing outside the current bounds grows the matrix, zero-filling any new
/// cells; reading outside the current bounds is a fault.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    cells: Vec<f64>,
}

impl Matrix {
    pub(crate) fn zeroed(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            cells: vec![0.0; rows * cols],
        }
    }

    pub(crate) fn identity(n: usize) -> Matrix {
        let mut matrix = Matrix::zeroed(n, n);
        for i in 0..n {
            matrix.cells[i * n + i] = 1.0;
        }
        matrix
    }

    pub fn rows(&self) -> usize { self.rows }

    pub fn cols(&self) -> usize { self.cols }

    pub fn get(&self, row: usize, col: usize) -> Result<f64, ValueError> {
        if row < self.rows && col < self.cols {
            Ok(self.cells[row * self.cols + col])
        } else {
            Err(ValueError::InvalidOperand)
        }
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        if col >= self.cols {
            let cols = col + 1;
            let mut cells = vec![0.0; self.rows * cols];
            for r in 0..self.rows {
                for c in 0..self.cols {
                    cells[r * cols + c] = self.cells[r * self.cols + c];
                }
            }
            self.cells = cells;
            self.cols = cols;
        }
        if row >= self.rows {
            self.rows = row + 1;
            self.cells.resize(self.rows * self.cols, 0.0);
        }
        self.cells[row * self.cols + col] = value;
    }

    fn same_shape(&self, other: &Matrix) -> bool {
        self.rows == other.rows && self.cols == other.cols
    }

    fn map<F>(&self, f: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            cells: self.cells.iter().map(|&v| f(v)).collect(),
        }
    }

    fn zip_map<F>(&self, other: &Matrix, f: F) -> Matrix
    where
        F: Fn(f64, f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            cells: self
                .cells
                .iter()
                .zip(&other.cells)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        }
    }

    fn matmul(&self, other: &Matrix) -> Result<Matrix, ValueError> {
        if self.cols != other.rows {
            return Err(ValueError::InvalidOperand);
        }

        let mut out = Matrix::zeroed(self.rows, other.cols);
        for row in 0..self.rows {
            for col in 0..other.cols {
                let mut sum = 0.0;
                for k in 0..self.cols {
                    sum += self.cells[row * self.cols + k]
                        * other.cells[k * other.cols + col];
                }
                out.cells[row * other.cols + col] = sum;
            }
        }

        Ok(out)
    }

    fn transposed(&self) -> Matrix {
        let mut out = Matrix::zeroed(self.cols, self.rows);
        for row in 0..self.rows {
            for col in 0..self.cols {
                out.cells[col * self.rows + row] =
                    self.cells[row * self.cols + col];
            }
        }
        out
    }

    /// Determinant of the matrix with one optional row/column pair removed.
    fn minor_det(&self, except: Option<(usize, usize)>) -> f64 {
        let n = match except {
            Some(_) => self.rows - 1,
            None => self.rows,
        };

        let mut cells = Vec::with_capacity(n * n);
        for row in 0..self.rows {
            if except.map(|(r, _)| r == row).unwrap_or(false) {
                continue;
            }
            for col in 0..self.cols {
                if except.map(|(_, c)| c == col).unwrap_or(false) {
                    continue;
                }
                cells.push(self.cells[row * self.cols + col]);
            }
        }

        primitives::det(n, &cells)
    }

    fn rows_text(&self, separator: &str) -> String {
        let mut out = String::new();
        for row in 0..self.rows {
            if row > 0 {
                out.push_str(separator);
            }
            out.push_str("[ ");
            for col in 0..self.cols {
                if col > 0 {
                    out.push_str(" , ");
                }
                out.push_str(&format::fixedout(
                    self.cells[row * self.cols + col],
                    format::DISPLAY_DIGITS,
                ));
            }
            out.push_str(" ]");
        }
        out
    }
}

/// A tagged numeric value: a complex scalar or a real matrix.
///
/// Scalars compare by both components, matrices by shape and storage, and a
/// scalar never equals a matrix.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Complex64),
    Matrix(Matrix),
}

impl Value {
    pub fn zero() -> Value { Value::Scalar(Complex64::new(0.0, 0.0)) }

    pub fn one() -> Value { Value::Scalar(Complex64::new(1.0, 0.0)) }

    pub fn real(re: f64) -> Value { Value::Scalar(Complex64::new(re, 0.0)) }

    pub fn complex(re: f64, im: f64) -> Value {
        Value::Scalar(Complex64::new(re, im))
    }

    pub fn re(&self) -> f64 {
        match self {
            Value::Scalar(c) => c.re,
            Value::Matrix(_) => 0.0,
        }
    }

    pub fn im(&self) -> f64 {
        match self {
            Value::Scalar(c) => c.im,
            Value::Matrix(_) => 0.0,
        }
    }

    pub fn is_scalar(&self) -> bool { matches!(self, Value::Scalar(_)) }

    pub fn is_real(&self) -> bool {
        matches!(self, Value::Scalar(c) if c.im == 0.0)
    }

    pub fn is_matrix(&self) -> bool { matches!(self, Value::Matrix(_)) }

    /// Whether the imaginary part survives display rounding; the printer
    /// parenthesizes such constants under tight operators.
    pub(crate) fn has_visible_imaginary(&self) -> bool {
        match self {
            Value::Scalar(c) => {
                format::fixedout(c.im, format::DISPLAY_DIGITS) != "0"
            },
            Value::Matrix(_) => false,
        }
    }

    pub fn add(&self, rhs: &Value) -> Result<Value, ValueError> {
        match (self, rhs) {
            (Value::Scalar(a), Value::Scalar(b)) => Ok(Value::Scalar(a + b)),
            (Value::Matrix(a), Value::Matrix(b)) if a.same_shape(b) => {
                Ok(Value::Matrix(a.zip_map(b, |x, y| x + y)))
            },
            _ => Err(ValueError::InvalidOperand),
        }
    }

    pub fn sub(&self, rhs: &Value) -> Result<Value, ValueError> {
        match (self, rhs) {
            (Value::Scalar(a), Value::Scalar(b)) => Ok(Value::Scalar(a - b)),
            (Value::Matrix(a), Value::Matrix(b)) if a.same_shape(b) => {
                Ok(Value::Matrix(a.zip_map(b, |x, y| x - y)))
            },
            _ => Err(ValueError::InvalidOperand),
        }
    }

    /// Multiplication: complex on scalars, element-wise on equally shaped
    /// matrices, and a broadcast when one operand is a real scalar.
    pub fn mul(&self, rhs: &Value) -> Result<Value, ValueError> {
        match (self, rhs) {
            (Value::Scalar(a), Value::Scalar(b)) => Ok(Value::Scalar(a * b)),
            (Value::Matrix(a), Value::Matrix(b)) if a.same_shape(b) => {
                Ok(Value::Matrix(a.zip_map(b, |x, y| x * y)))
            },
            (Value::Scalar(s), Value::Matrix(m)) if s.im == 0.0 => {
                let scale = s.re;
                Ok(Value::Matrix(m.map(|v| scale * v)))
            },
            (Value::Matrix(m), Value::Scalar(s)) if s.im == 0.0 => {
                let scale = s.re;
                Ok(Value::Matrix(m.map(|v| v * scale)))
            },
            _ => Err(ValueError::InvalidOperand),
        }
    }

    /// Division: conjugate-normalized on scalars (a domain error when the
    /// divisor's squared modulus is zero), a broadcast when dividing a matrix
    /// by a real scalar.
    pub fn div(&self, rhs: &Value) -> Result<Value, ValueError> {
        match (self, rhs) {
            (Value::Scalar(a), Value::Scalar(b)) => {
                let modulus = b.norm_sqr();
                if modulus == 0.0 {
                    return Err(ValueError::Domain);
                }
                Ok(Value::Scalar(a * b.conj() / modulus))
            },
            (Value::Matrix(m), Value::Scalar(s)) if s.im == 0.0 => {
                let scale = s.re;
                Ok(Value::Matrix(m.map(|v| v / scale)))
            },
            _ => Err(ValueError::InvalidOperand),
        }
    }

    /// Truncating integer remainder, defined for two real integer-valued
    /// scalars only.
    pub fn rem(&self, rhs: &Value) -> Result<Value, ValueError> {
        match (self, rhs) {
            (Value::Scalar(a), Value::Scalar(b))
                if a.im == 0.0
                    && b.im == 0.0
                    && a.re == a.re.trunc()
                    && b.re == b.re.trunc() =>
            {
                let divisor = b.re as i64;
                if divisor == 0 {
                    return Err(ValueError::Domain);
                }
                Ok(Value::real(((a.re as i64) % divisor) as f64))
            },
            _ => Err(ValueError::InvalidOperand),
        }
    }

    /// Exponentiation.
    ///
    /// Integer exponents use a squaring ladder (on scalars and on square
    /// matrices, negative exponents going through the reciprocal or the
    /// inverse); other real exponents use the polar form of the base.
    pub fn pow(&self, rhs: &Value) -> Result<Value, ValueError> {
        match (self, rhs) {
            (Value::Scalar(base), Value::Scalar(exp))
                if exp.im == 0.0 && exp.re == exp.re.trunc() =>
            {
                let mut r = Complex64::new(1.0, 0.0);
                let mut x = *base;
                let mut p = exp.re.abs() as i64;
                while p > 0 {
                    if p & 1 == 1 {
                        r *= x;
                    }
                    x *= x;
                    p >>= 1;
                }
                if exp.re < 0.0 {
                    Value::one().div(&Value::Scalar(r))
                } else {
                    Ok(Value::Scalar(r))
                }
            },
            (Value::Scalar(base), Value::Scalar(exp)) if exp.im == 0.0 => {
                let rn = primitives::pow(base.norm_sqr(), exp.re / 2.0)?;
                let nphi = primitives::atan2(base.im, base.re)? * exp.re;
                Ok(Value::Scalar(Complex64::new(
                    rn * primitives::cos(nphi),
                    rn * primitives::sin(nphi),
                )))
            },
            (Value::Matrix(base), Value::Scalar(exp))
                if base.rows == base.cols
                    && exp.im == 0.0
                    && exp.re == exp.re.trunc() =>
            {
                if exp.re < 0.0 {
                    return self.inv()?.pow(&Value::real(-exp.re));
                }
                let mut r = Matrix::identity(base.rows);
                let mut x = base.clone();
                let mut p = exp.re as i64;
                while p > 0 {
                    if p & 1 == 1 {
                        r = r.matmul(&x)?;
                    }
                    x = x.matmul(&x)?;
                    p >>= 1;
                }
                Ok(Value::Matrix(r))
            },
            _ => Err(ValueError::InvalidOperand),
        }
    }

    /// Matrix multiplication, requiring conformable shapes.
    pub fn matmul(&self, rhs: &Value) -> Result<Value, ValueError> {
        match (self, rhs) {
            (Value::Matrix(a), Value::Matrix(b)) => {
                Ok(Value::Matrix(a.matmul(b)?))
            },
            _ => Err(ValueError::InvalidOperand),
        }
    }

    /// Modulus of a scalar, determinant of a matrix.
    pub fn abs(&self) -> Result<Value, ValueError> {
        match self {
            Value::Scalar(c) => Ok(Value::real(primitives::sqrt(c.norm_sqr())?)),
            Value::Matrix(_) => self.det(),
        }
    }

    fn real_arg(&self) -> Result<f64, ValueError> {
        match self {
            Value::Scalar(c) if c.im == 0.0 => Ok(c.re),
            _ => Err(ValueError::Domain),
        }
    }

    pub fn sqrt(&self) -> Result<Value, ValueError> {
        Ok(Value::real(primitives::sqrt(self.real_arg()?)?))
    }

    pub fn exp(&self) -> Result<Value, ValueError> {
        Ok(Value::real(primitives::exp(self.real_arg()?)))
    }

    pub fn ln(&self) -> Result<Value, ValueError> {
        Ok(Value::real(primitives::ln(self.real_arg()?)?))
    }

    pub fn sin(&self) -> Result<Value, ValueError> {
        Ok(Value::real(primitives::sin(self.real_arg()?)))
    }

    pub fn cos(&self) -> Result<Value, ValueError> {
        Ok(Value::real(primitives::cos(self.real_arg()?)))
    }

    pub fn tan(&self) -> Result<Value, ValueError> {
        Ok(Value::real(primitives::tan(self.real_arg()?)?))
    }

    pub fn cot(&self) -> Result<Value, ValueError> {
        Ok(Value::real(primitives::cot(self.real_arg()?)?))
    }

    pub fn atan(&self) -> Result<Value, ValueError> {
        Ok(Value::real(primitives::atan(self.real_arg()?)))
    }

    pub fn deg_to_rad(&self) -> Result<Value, ValueError> {
        Ok(Value::real(primitives::deg_to_rad(self.real_arg()?)))
    }

    pub fn rad_to_deg(&self) -> Result<Value, ValueError> {
        Ok(Value::real(primitives::rad_to_deg(self.real_arg()?)))
    }

    /// Determinant of a square matrix.
    pub fn det(&self) -> Result<Value, ValueError> {
        match self {
            Value::Matrix(m) if m.rows == m.cols => {
                Ok(Value::real(m.minor_det(None)))
            },
            _ => Err(ValueError::InvalidOperand),
        }
    }

    /// Cofactor matrix: entry `(r, c)` is the minor determinant with row `r`
    /// and column `c` removed, signed by `(-1)^(r+c)`.
    pub fn cof(&self) -> Result<Value, ValueError> {
        match self {
            Value::Matrix(m) if m.rows == m.cols => {
                let mut out = Matrix::zeroed(m.rows, m.cols);
                for row in 0..m.rows {
                    for col in 0..m.cols {
                        let sign = if (row + col) % 2 == 1 { -1.0 } else { 1.0 };
                        out.cells[row * out.cols + col] =
                            sign * m.minor_det(Some((row, col)));
                    }
                }
                Ok(Value::Matrix(out))
            },
            _ => Err(ValueError::InvalidOperand),
        }
    }

    pub fn trans(&self) -> Result<Value, ValueError> {
        match self {
            Value::Matrix(m) => Ok(Value::Matrix(m.transposed())),
            Value::Scalar(_) => Err(ValueError::InvalidOperand),
        }
    }

    pub fn adj(&self) -> Result<Value, ValueError> { self.cof()?.trans() }

    /// Adjugate over determinant, refused for near-singular matrices.
    pub fn inv(&self) -> Result<Value, ValueError> {
        let det = self.det()?;
        if det.re().abs() < 1e-9 {
            return Err(ValueError::InvalidOperand);
        }
        self.adj()?.div(&det)
    }

    /// The bracketed single-line form used by the diagnostic tree printer.
    pub(crate) fn tree_form(&self) -> String {
        match self {
            Value::Scalar(_) => self.to_string(),
            Value::Matrix(m) => format!("[{}]", m.rows_text(";")),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(c) => f.write_str(&format::print_polynom(
                &[(0.0, c.re), (1.0, c.im)],
                "i",
            )),
            Value::Matrix(m) => f.write_str(&m.rows_text("\n  ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn re(x: f64) -> Value { Value::real(x) }

    fn cx(re: f64, im: f64) -> Value { Value::complex(re, im) }

    fn mat(rows: usize, cols: usize, cells: &[f64]) -> Value {
        let mut m = Matrix::zeroed(rows, cols);
        for r in 0..rows {
            for c in 0..cols {
                m.set(r, c, cells[r * cols + c]);
            }
        }
        Value::Matrix(m)
    }

    #[test]
    fn scalar_arithmetic() {
        let inputs = vec![
            (cx(1.0, 2.0).add(&cx(3.0, -1.0)), cx(4.0, 1.0)),
            (cx(1.0, 2.0).sub(&cx(3.0, -1.0)), cx(-2.0, 3.0)),
            (cx(1.0, 2.0).mul(&cx(3.0, 4.0)), cx(-5.0, 10.0)),
            (re(1.0).div(&cx(0.0, 1.0)), cx(0.0, -1.0)),
            (re(7.0).rem(&re(3.0)), re(1.0)),
            (re(-7.0).rem(&re(3.0)), re(-1.0)),
        ];

        for (got, should_be) in inputs {
            assert_eq!(got, Ok(should_be));
        }
    }

    #[test]
    fn division_by_zero_modulus_is_a_domain_error() {
        assert_eq!(re(1.0).div(&cx(0.0, 0.0)), Err(ValueError::Domain));
    }

    #[test]
    fn remainder_needs_real_integers() {
        assert_eq!(re(7.5).rem(&re(3.0)), Err(ValueError::InvalidOperand));
        assert_eq!(cx(7.0, 1.0).rem(&re(3.0)), Err(ValueError::InvalidOperand));
        assert_eq!(re(7.0).rem(&re(0.0)), Err(ValueError::Domain));
    }

    #[test]
    fn powers() {
        assert_eq!(re(2.0).pow(&re(10.0)), Ok(re(1024.0)));
        assert_eq!(re(2.0).pow(&re(-1.0)), Ok(re(0.5)));
        assert_eq!(re(2.0).pow(&re(0.0)), Ok(re(1.0)));
        assert_eq!(cx(1.0, 1.0).pow(&re(2.0)), Ok(cx(0.0, 2.0)));
        // a non-integer exponent goes through the polar form
        assert_eq!(re(4.0).pow(&re(0.5)), Ok(re(2.0)));
        // a complex exponent is not supported
        assert_eq!(
            re(2.0).pow(&cx(0.0, 1.0)),
            Err(ValueError::InvalidOperand)
        );
    }

    #[test]
    fn matrix_powers() {
        let m = mat(2, 2, &[2.0, 0.0, 0.0, 2.0]);
        assert_eq!(m.pow(&re(2.0)), Ok(mat(2, 2, &[4.0, 0.0, 0.0, 4.0])));
        assert_eq!(m.pow(&re(0.0)), Ok(mat(2, 2, &[1.0, 0.0, 0.0, 1.0])));
        assert_eq!(m.pow(&re(-1.0)), Ok(mat(2, 2, &[0.5, 0.0, 0.0, 0.5])));

        let wide = mat(1, 2, &[1.0, 2.0]);
        assert_eq!(wide.pow(&re(2.0)), Err(ValueError::InvalidOperand));
    }

    #[test]
    fn matrix_arithmetic() {
        let a = mat(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let b = mat(2, 2, &[5.0, 6.0, 7.0, 8.0]);

        assert_eq!(a.add(&b), Ok(mat(2, 2, &[6.0, 8.0, 10.0, 12.0])));
        assert_eq!(b.sub(&a), Ok(mat(2, 2, &[4.0, 4.0, 4.0, 4.0])));
        assert_eq!(a.mul(&b), Ok(mat(2, 2, &[5.0, 12.0, 21.0, 32.0])));
        assert_eq!(a.mul(&re(2.0)), Ok(mat(2, 2, &[2.0, 4.0, 6.0, 8.0])));
        assert_eq!(re(2.0).mul(&a), Ok(mat(2, 2, &[2.0, 4.0, 6.0, 8.0])));
        assert_eq!(a.div(&re(2.0)), Ok(mat(2, 2, &[0.5, 1.0, 1.5, 2.0])));

        let wide = mat(1, 2, &[1.0, 2.0]);
        assert_eq!(a.add(&wide), Err(ValueError::InvalidOperand));
        assert_eq!(a.add(&re(1.0)), Err(ValueError::InvalidOperand));
        assert_eq!(a.mul(&cx(0.0, 1.0)), Err(ValueError::InvalidOperand));
    }

    #[test]
    fn matrix_multiplication() {
        let a = mat(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let v = mat(2, 1, &[5.0, 6.0]);

        assert_eq!(a.matmul(&v), Ok(mat(2, 1, &[17.0, 39.0])));
        assert_eq!(v.matmul(&a), Err(ValueError::InvalidOperand));
        assert_eq!(a.matmul(&re(1.0)), Err(ValueError::InvalidOperand));
    }

    #[test]
    fn determinant_and_friends() {
        let m = mat(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(m.det(), Ok(re(-2.0)));
        assert_eq!(m.trans(), Ok(mat(2, 2, &[1.0, 3.0, 2.0, 4.0])));
        assert_eq!(mat(1, 2, &[1.0, 2.0]).det(), Err(ValueError::InvalidOperand));
        assert_eq!(re(3.0).det(), Err(ValueError::InvalidOperand));

        // |M| is invariant under transposition
        let m = mat(3, 3, &[2.0, 7.0, 1.0, 0.0, 4.0, 3.0, 5.0, 1.0, 9.0]);
        let t = m.trans().unwrap();
        assert_eq!(m.det(), t.det());
    }

    #[test]
    fn absolute_value() {
        assert_eq!(cx(3.0, 4.0).abs(), Ok(re(5.0)));
        assert_eq!(re(-3.0).abs(), Ok(re(3.0)));
        assert_eq!(mat(2, 2, &[1.0, 2.0, 3.0, 4.0]).abs(), Ok(re(-2.0)));
    }

    #[test]
    fn inverse() {
        let m = mat(2, 2, &[4.0, 7.0, 2.0, 6.0]);
        let inv = m.inv().unwrap();
        let product = m.matmul(&inv).unwrap();

        if let Value::Matrix(p) = product {
            for row in 0..2 {
                for col in 0..2 {
                    let should_be = if row == col { 1.0 } else { 0.0 };
                    approx::assert_abs_diff_eq!(
                        p.get(row, col).unwrap(),
                        should_be,
                        epsilon = 1e-6
                    );
                }
            }
        } else {
            panic!("Expected a matrix");
        }

        // a singular matrix has no inverse
        let singular = mat(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        assert_eq!(singular.inv(), Err(ValueError::InvalidOperand));
    }

    #[test]
    fn division_round_trips() {
        let x = cx(3.0, 2.0);
        let y = cx(1.0, -7.0);

        let got = x.div(&y).unwrap().mul(&y).unwrap();

        approx::assert_abs_diff_eq!(got.re(), x.re(), epsilon = 1e-12);
        approx::assert_abs_diff_eq!(got.im(), x.im(), epsilon = 1e-12);
    }

    #[test]
    fn real_only_unaries() {
        assert_eq!(re(4.0).sqrt(), Ok(re(2.0)));
        assert_eq!(re(-4.0).sqrt(), Err(ValueError::Domain));
        assert_eq!(cx(4.0, 1.0).sqrt(), Err(ValueError::Domain));
        assert_eq!(mat(1, 1, &[4.0]).sqrt(), Err(ValueError::Domain));
        assert_eq!(re(1.0).ln(), Ok(re(0.0)));
        assert_eq!(re(0.0).sin(), Ok(re(0.0)));
        assert_eq!(re(0.0).cot(), Err(ValueError::Domain));

        approx::assert_abs_diff_eq!(
            re(180.0).deg_to_rad().unwrap().re(),
            std::f64::consts::PI,
            epsilon = 1e-12
        );
        approx::assert_abs_diff_eq!(
            re(std::f64::consts::PI).rad_to_deg().unwrap().re(),
            180.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn growable_writes_and_bounded_reads() {
        let mut m = Matrix::zeroed(1, 1);
        m.set(1, 2, 5.0);

        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 3);
        assert_eq!(m.get(0, 0), Ok(0.0));
        assert_eq!(m.get(1, 2), Ok(5.0));
        assert_eq!(m.get(2, 0), Err(ValueError::InvalidOperand));
    }

    #[test]
    fn equality_is_exact_and_kind_aware() {
        assert_eq!(re(0.0), Value::zero());
        assert_ne!(re(0.0), mat(1, 1, &[0.0]));
        assert_ne!(mat(1, 4, &[1.0, 2.0, 3.0, 4.0]), mat(2, 2, &[1.0, 2.0, 3.0, 4.0]));
        assert_eq!(cx(1.0, 2.0), cx(1.0, 2.0));
        assert_ne!(cx(1.0, 2.0), cx(1.0, -2.0));
    }

    #[test]
    fn kind_predicates() {
        assert!(re(1.0).is_real());
        assert!(re(1.0).is_scalar());
        assert!(!cx(1.0, 2.0).is_real());
        assert!(cx(1.0, 2.0).is_scalar());
        assert!(mat(1, 1, &[1.0]).is_matrix());
        assert!(!mat(1, 1, &[1.0]).is_scalar());
    }

    #[test]
    fn display() {
        let inputs = vec![
            (re(3.0), "3"),
            (re(-3.0), "-3"),
            (re(0.0), "0"),
            (cx(3.0, 2.0), "3 + 2i"),
            (cx(0.0, 1.0), "i"),
            (cx(0.0, -1.0), "-i"),
            (cx(1.5, -2.0), "1.5 - 2i"),
            (mat(2, 2, &[1.0, 2.0, 3.0, 4.0]), "[ 1 , 2 ]\n  [ 3 , 4 ]"),
        ];

        for (value, should_be) in inputs {
            assert_eq!(value.to_string(), should_be);
        }

        assert_eq!(
            mat(2, 2, &[1.0, 2.0, 3.0, 4.0]).tree_form(),
            "[[ 1 , 2 ];[ 3 , 4 ]]"
        );
    }
}
