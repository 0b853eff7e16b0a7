//! Closed-form solving of single-variable polynomial equations of degree
//! two or less.

use crate::{
    expr::{BinOp, Expression, Node},
    format,
};
use arrayvec::ArrayVec;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Options for the closed-form solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverOptions {
    /// Tolerance used by the root check: candidates are accepted only when
    /// the polynomial evaluated at them stays within this distance of zero.
    pub precision: f64,
}

impl Default for SolverOptions {
    fn default() -> Self { SolverOptions { precision: 1e-6 } }
}

/// A finite floating-point key with a total order, used for power →
/// coefficient maps.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Power(pub f64);

impl Eq for Power {}

impl Ord for Power {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal)
    }
}

/// `Σ coefficient·X^power`, keyed by power.
///
/// Root records reuse the same shape as a polynomial in `i`: power 0 holds
/// the real part and power 1 appears only when the imaginary part is
/// non-zero.
pub type Polynomial = BTreeMap<Power, f64>;

/// Extracts the polynomial from a reduced one-sided equation and produces
/// closed-form roots for degrees 0 to 2, with a precision check against the
/// extracted coefficients.
#[derive(Debug, Clone)]
pub struct PolySolver {
    expr: Option<Expression>,
    solved: bool,
    message: String,
    options: SolverOptions,
    polynom: Polynomial,
    roots: ArrayVec<[Polynomial; 2]>,
    degree: i32,
    a: f64,
    b: f64,
    c: f64,
    d: f64,
}

impl PolySolver {
    pub fn new(equation: &str) -> PolySolver {
        PolySolver::with_options(equation, SolverOptions::default())
    }

    pub fn with_options(equation: &str, options: SolverOptions) -> PolySolver {
        let mut solver = PolySolver {
            expr: None,
            solved: false,
            message: String::new(),
            options,
            polynom: Polynomial::new(),
            roots: ArrayVec::new(),
            degree: 0,
            a: 0.0,
            b: 0.0,
            c: 0.0,
            d: 0.0,
        };

        if let Err(message) = solver.read_equation(equation) {
            solver.message = message;
            return solver;
        }
        solver.solved = true;

        if let Err(message) = solver.check_degree() {
            solver.message = message;
            return solver;
        }

        solver.solve();
        solver
    }

    /// Whether a single-variable equation could be read at all; degree and
    /// precision failures still count as "solved" and are narrated by
    /// [`PolySolver::message`].
    pub fn solved(&self) -> bool { self.solved }

    /// A human-readable narrative of the outcome.
    pub fn message(&self) -> &str { &self.message }

    pub fn degree(&self) -> i32 { self.degree }

    pub fn discriminant(&self) -> f64 { self.d }

    /// The accepted roots, smallest first for real pairs, the negative
    /// imaginary part first for complex pairs.
    pub fn roots(&self) -> &[Polynomial] { &self.roots }

    /// The extracted polynomial rendered with the equation's variable (or
    /// `X` when the equation had none).
    pub fn reduced_form(&self) -> String {
        let var = match self.expr.as_ref().and_then(|e| e.vars().iter().next())
        {
            Some(name) => name.to_string(),
            None => "X".to_string(),
        };

        let terms: Vec<(f64, f64)> = self
            .polynom
            .iter()
            .map(|(&Power(power), &coefficient)| (power, coefficient))
            .collect();
        format::print_polynom(&terms, &var)
    }

    fn read_equation(&mut self, equation: &str) -> Result<(), String> {
        let mut expr = match Expression::new(equation) {
            Ok(expr) => expr,
            Err(e) => return Err(e.to_string()),
        };

        if !matches!(expr.root(), Node::Binary { op: BinOp::Eq, .. }) {
            return Err("Can't read an equation".to_string());
        }
        if expr.vars().len() > 1 {
            return Err(format!(
                "There are {} variables in the equation, unable to solve",
                expr.vars().len()
            ));
        }

        expr.reduce();
        self.expr = Some(expr);
        Ok(())
    }

    fn check_degree(&mut self) -> Result<(), String> {
        if let Some(expr) = &self.expr {
            if let Node::Binary {
                op: BinOp::Eq,
                left,
                ..
            } = expr.root()
            {
                collect_polynom(left, &mut self.polynom, 1.0);
            }
        }

        let mut maxdeg = 0.0_f64;
        let mut mindeg = f64::INFINITY;
        let mut fractional = false;

        for (&Power(power), &coefficient) in &self.polynom {
            if coefficient == 0.0 {
                continue;
            }
            if power > maxdeg {
                maxdeg = power;
            }
            if power < mindeg {
                mindeg = power;
            }
            if power == 2.0 {
                self.a = coefficient;
            } else if power == 1.0 {
                self.b = coefficient;
            } else if power == 0.0 {
                self.c = coefficient;
            } else {
                fractional = true;
            }
        }
        self.degree = maxdeg as i32;

        if mindeg < 0.0 {
            return Err("Negative powers present, unable to solve".to_string());
        }
        if self.degree > 2 {
            return Err(
                "The polynomial degree is strictly greater than 2, unable to solve"
                    .to_string(),
            );
        }
        if fractional {
            return Err("Fractional powers present, unable to solve".to_string());
        }

        for k in 1..=2 {
            let key = Power(f64::from(k));
            if self.polynom.get(&key) == Some(&0.0) {
                self.polynom.remove(&key);
            }
        }

        Ok(())
    }

    fn solve(&mut self) {
        let precision = self.options.precision;
        let (a, b, c) = (self.a, self.b, self.c);

        match self.degree {
            0 => {
                self.message = if c != 0.0 {
                    "There is no solution".to_string()
                } else {
                    "The solution is every real number".to_string()
                };
            },
            1 => {
                let root = -c / b;
                if check_root(root, 0.0, a, b, c, precision) {
                    self.message = "The solution is:".to_string();
                    self.add_root(root, 0.0);
                } else {
                    self.message =
                        "There is one solution, but it can't be computed precisely enough"
                            .to_string();
                }
            },
            2 => {
                self.d = b * b - 4.0 * a * c;
                if self.d < 0.0 {
                    let re = -b / (2.0 * a);
                    let im = ((-self.d).sqrt() / (2.0 * a)).abs();
                    if check_root(re, -im, a, b, c, precision)
                        && check_root(re, im, a, b, c, precision)
                    {
                        self.message =
                            "Discriminant is strictly negative, the two complex solutions are:"
                                .to_string();
                        self.add_root(re, -im);
                        self.add_root(re, im);
                    } else {
                        self.message =
                            "Discriminant is strictly negative, there are complex solutions, but they can't be computed precisely enough"
                                .to_string();
                    }
                } else if self.d == 0.0 {
                    let root = -b / (2.0 * a);
                    if check_root(root, 0.0, a, b, c, precision) {
                        self.message =
                            "Discriminant is zero, the only real (double) solution is:"
                                .to_string();
                        self.add_root(root, 0.0);
                    } else {
                        self.message =
                            "Discriminant is zero, but the only solution can't be computed precisely enough"
                                .to_string();
                    }
                } else {
                    let sqrt_d = self.d.sqrt();
                    let smaller = (-b - sqrt_d) / (2.0 * a);
                    let larger = (-b + sqrt_d) / (2.0 * a);
                    if check_root(smaller, 0.0, a, b, c, precision)
                        && check_root(larger, 0.0, a, b, c, precision)
                    {
                        self.message =
                            "Discriminant is strictly positive, the two solutions are:"
                                .to_string();
                        self.add_root(smaller, 0.0);
                        self.add_root(larger, 0.0);
                    } else {
                        self.message =
                            "Discriminant is strictly positive, there are two solutions, but they can't be computed precisely enough"
                                .to_string();
                    }
                }
            },
            _ => {},
        }
    }

    fn add_root(&mut self, re: f64, im: f64) {
        let mut root = Polynomial::new();
        root.insert(Power(0.0), re);
        if im != 0.0 {
            root.insert(Power(1.0), im);
        }
        self.roots.push(root);
    }
}

/// A candidate `(re, im)` passes when the quadratic evaluated at it is
/// within `precision` of zero, on the real and imaginary parts separately.
fn check_root(re: f64, im: f64, a: f64, b: f64, c: f64, precision: f64) -> bool {
    (a * re * re - a * im * im + b * re + c).abs() < precision
        && (2.0 * a * re * im + b * im).abs() < precision
}

/// Walk an additive tree into a power → coefficient map, with a running
/// sign flipped by the right branch of every `-`.
///
/// Shapes outside the recognized patterns (constants, bare variables,
/// `X^const`, and products with exactly one constant factor) simply
/// contribute nothing; degree validation catches the fallout.
fn collect_polynom(node: &Node, polynom: &mut Polynomial, sign: f64) {
    match node {
        Node::Binary {
            op: BinOp::Add,
            left,
            right,
        } => {
            collect_polynom(left, polynom, sign);
            collect_polynom(right, polynom, sign);
        },
        Node::Binary {
            op: BinOp::Sub,
            left,
            right,
        } => {
            collect_polynom(left, polynom, sign);
            collect_polynom(right, polynom, -sign);
        },
        Node::Constant(value) => {
            *polynom.entry(Power(0.0)).or_insert(0.0) += sign * value.re();
        },
        Node::Binary {
            op: BinOp::Pow,
            right,
            ..
        } => {
            if let Node::Constant(power) = &**right {
                *polynom.entry(Power(power.re())).or_insert(0.0) += sign;
            }
        },
        Node::Binary {
            op: BinOp::Mul,
            left,
            right,
        } => {
            let (coefficient, term) = match (&**left, &**right) {
                (Node::Constant(value), term) => (value, term),
                (term, Node::Constant(value)) => (value, term),
                _ => return,
            };
            let power = match term {
                Node::Variable(_) => 1.0,
                Node::Binary {
                    op: BinOp::Pow,
                    right,
                    ..
                } => match &**right {
                    Node::Constant(power) => power.re(),
                    _ => return,
                },
                _ => return,
            };
            *polynom.entry(Power(power)).or_insert(0.0) +=
                sign * coefficient.re();
        },
        Node::Variable(_) => {
            *polynom.entry(Power(1.0)).or_insert(0.0) += sign;
        },
        _ => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root_parts(root: &Polynomial) -> (f64, f64) {
        let re = root.get(&Power(0.0)).copied().unwrap_or(0.0);
        let im = root.get(&Power(1.0)).copied().unwrap_or(0.0);
        (re, im)
    }

    #[test]
    fn two_real_roots() {
        let solver = PolySolver::new("X^2 - 1 = 0");

        assert!(solver.solved());
        assert_eq!(solver.degree(), 2);
        assert_eq!(solver.discriminant(), 4.0);
        assert_eq!(solver.roots().len(), 2);
        assert_eq!(root_parts(&solver.roots()[0]), (-1.0, 0.0));
        assert_eq!(root_parts(&solver.roots()[1]), (1.0, 0.0));
        assert!(solver
            .message()
            .starts_with("Discriminant is strictly positive"));
        // the imaginary entry is absent for real roots
        assert_eq!(solver.roots()[0].get(&Power(1.0)), None);
    }

    #[test]
    fn one_linear_root() {
        let solver = PolySolver::new("2 * X + 4 = 0");

        assert!(solver.solved());
        assert_eq!(solver.degree(), 1);
        assert_eq!(solver.roots().len(), 1);
        assert_eq!(root_parts(&solver.roots()[0]), (-2.0, 0.0));
    }

    #[test]
    fn complex_root_pair() {
        let solver = PolySolver::new("X^2 + 1 = 0");

        assert!(solver.solved());
        assert_eq!(solver.degree(), 2);
        assert_eq!(solver.discriminant(), -4.0);
        assert_eq!(solver.roots().len(), 2);
        assert_eq!(root_parts(&solver.roots()[0]), (0.0, -1.0));
        assert_eq!(root_parts(&solver.roots()[1]), (0.0, 1.0));
        assert!(solver
            .message()
            .starts_with("Discriminant is strictly negative"));
    }

    #[test]
    fn every_real_number() {
        let solver = PolySolver::new("5 = 5");

        assert!(solver.solved());
        assert_eq!(solver.degree(), 0);
        assert_eq!(solver.message(), "The solution is every real number");
        assert!(solver.roots().is_empty());
    }

    #[test]
    fn no_solution() {
        let solver = PolySolver::new("7 = 5");

        assert!(solver.solved());
        assert_eq!(solver.degree(), 0);
        assert_eq!(solver.message(), "There is no solution");
        assert!(solver.roots().is_empty());
    }

    #[test]
    fn double_root() {
        let solver = PolySolver::new("X^2 - 2*X + 1 = 0");

        assert!(solver.solved());
        assert_eq!(solver.discriminant(), 0.0);
        assert_eq!(solver.roots().len(), 1);
        assert_eq!(root_parts(&solver.roots()[0]), (1.0, 0.0));
        assert!(solver.message().starts_with("Discriminant is zero"));
    }

    #[test]
    fn not_an_equation() {
        let solver = PolySolver::new("x + 1");

        assert!(!solver.solved());
        assert_eq!(solver.message(), "Can't read an equation");
    }

    #[test]
    fn too_many_variables() {
        let solver = PolySolver::new("x + y = 0");

        assert!(!solver.solved());
        assert_eq!(
            solver.message(),
            "There are 2 variables in the equation, unable to solve"
        );
    }

    #[test]
    fn degree_too_high() {
        let solver = PolySolver::new("X^3 = 0");

        assert!(solver.solved());
        assert_eq!(solver.degree(), 3);
        assert!(solver.message().contains("strictly greater than 2"));
        assert!(solver.roots().is_empty());
    }

    #[test]
    fn negative_powers() {
        let solver = PolySolver::new("X^-1 = 0");

        assert!(solver.solved());
        assert!(solver.message().starts_with("Negative powers"));
    }

    #[test]
    fn fractional_powers() {
        let solver = PolySolver::new("X^0.5 = 0");

        assert!(solver.solved());
        assert!(solver.message().starts_with("Fractional powers"));
    }

    #[test]
    fn reduced_form_uses_the_equation_variable() {
        let solver = PolySolver::new("X^2 - 1 = 0");
        assert_eq!(solver.reduced_form(), "-1 + x^2");

        let solver = PolySolver::new("5 = 5");
        assert_eq!(solver.reduced_form(), "0");
    }

    #[test]
    fn imprecise_roots_are_not_reported() {
        let options = SolverOptions { precision: 1e-300 };
        let solver = PolySolver::with_options("X^2 - 2 = 0", options);

        assert!(solver.solved());
        assert!(solver.roots().is_empty());
        assert!(solver.message().ends_with("precisely enough"));
    }

    #[test]
    fn nonzero_right_sides_are_reduced_over() {
        let solver = PolySolver::new("X^2 = 1");

        assert_eq!(solver.degree(), 2);
        assert_eq!(solver.roots().len(), 2);
        assert_eq!(root_parts(&solver.roots()[0]), (-1.0, 0.0));
        assert_eq!(root_parts(&solver.roots()[1]), (1.0, 0.0));
    }
}
