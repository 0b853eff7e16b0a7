//! Number and polynomial text rendering shared by the printer and the
//! solver.

pub(crate) const DISPLAY_DIGITS: usize = 6;

/// Fixed-point rendering of `value` with `digits` decimal places, trailing
/// zeros (and a bare trailing dot) trimmed away.
pub(crate) fn fixedout(value: f64, digits: usize) -> String {
    // `-0` renders the same as `0`
    let value = if value == 0.0 { 0.0 } else { value };
    let s = format!("{:.*}", digits, value);

    match s.find('.') {
        Some(dot) => {
            let fraction = s[dot..].trim_end_matches('0');
            if fraction == "." {
                s[..dot].to_string()
            } else {
                format!("{}{}", &s[..dot], fraction)
            }
        },
        None => s,
    }
}

/// Render `Σ coefficient·var^power` from `(power, coefficient)` terms sorted
/// by ascending power.
///
/// The highest zero coefficients are dropped, a coefficient of one is left
/// implicit (except for the constant term), and the sign of each term is
/// folded into the `+`/`-` that joins it to the previous one.
pub(crate) fn print_polynom(terms: &[(f64, f64)], var: &str) -> String {
    let mut terms = terms.to_vec();
    while terms.len() > 1 && terms[terms.len() - 1].1 == 0.0 {
        terms.pop();
    }
    let all_zero = terms.iter().all(|&(_, coefficient)| coefficient == 0.0);

    let mut out = String::new();
    let mut printed_any = false;

    for &(power, coefficient) in &terms {
        if coefficient == 0.0 && !all_zero {
            continue;
        }

        let negative = coefficient < 0.0 && fixedout(coefficient, DISPLAY_DIGITS) != "0";
        if printed_any {
            out.push_str(if negative { " - " } else { " + " });
        } else if negative {
            out.push('-');
        }

        let magnitude = fixedout(coefficient.abs(), DISPLAY_DIGITS);
        if power == 0.0 || magnitude != "1" {
            out.push_str(&magnitude);
        }
        if power != 0.0 {
            out.push_str(var);
            if power < 0.0 {
                out.push_str(&format!("^({})", fixedout(power, DISPLAY_DIGITS)));
            } else if power > 1.0 {
                out.push_str(&format!("^{}", fixedout(power, DISPLAY_DIGITS)));
            }
        }

        printed_any = true;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_rendering_trims_trailing_zeros() {
        let inputs = vec![
            (3.14, 2, "3.14"),
            (3.14, 6, "3.14"),
            (31.0, 0, "31"),
            (0.0, 6, "0"),
            (-0.0, 6, "0"),
            (2.5, 1, "2.5"),
            (1000.0, 6, "1000"),
            (-3.0, 6, "-3"),
            (7.0, 1000, "7"),
            (0.5, 1, "0.5"),
        ];

        for (value, digits, should_be) in inputs {
            assert_eq!(fixedout(value, digits), should_be);
        }
    }

    #[test]
    fn polynomial_rendering() {
        let inputs: Vec<(&[(f64, f64)], &str, &str)> = vec![
            (&[(0.0, -1.0), (2.0, 1.0)], "x", "-1 + x^2"),
            (&[(0.0, 0.0), (1.0, 1.0)], "i", "i"),
            (&[(0.0, 0.0), (1.0, 0.0)], "i", "0"),
            (&[(0.0, 3.0), (1.0, 2.0)], "i", "3 + 2i"),
            (&[(0.0, 0.0), (1.0, -1.0)], "i", "-i"),
            (&[(0.0, 5.0)], "x", "5"),
            (&[(0.0, -2.5), (1.0, -1.0), (2.0, 3.0)], "x", "-2.5 - x + 3x^2"),
            (&[(0.0, 1.5), (1.0, -2.0)], "i", "1.5 - 2i"),
        ];

        for (terms, var, should_be) in inputs {
            assert_eq!(print_polynom(terms, var), should_be);
        }
    }
}
