//! The reduction engine: substitution, inlining and folding.

use crate::{
    expr::{BinOp, Expression, Node},
    value::{Value, ValueError},
};
use num_complex::Complex64;
use smol_str::SmolStr;
use std::collections::BTreeMap;
use std::f64::consts::{E, PI};

/// The caller-owned definition table, mapping lowercase names to previously
/// accepted expressions.
///
/// A variable binding has the shape `name = value`; a function binding has
/// the shape `name(parameter) = body` with a variable as the parameter. The
/// engine trusts this shape and never mutates the table; enforcing it is the
/// table owner's job.
pub type Definitions = BTreeMap<SmolStr, Expression>;

/// A single bottom-up pass over the tree: children first, then function
/// inlining, variable substitution, additive constant-chain folding, and
/// finally constant/identity folding at this node.
///
/// Errors from the value domain abort the pass, possibly leaving the tree
/// partially rewritten.
pub(crate) fn eval(
    node: &mut Node,
    defs: &Definitions,
    except: Option<&str>,
) -> Result<(), ValueError> {
    match node {
        Node::Binary { left, right, .. } => {
            eval(left, defs, except)?;
            eval(right, defs, except)?;
        },
        Node::Call { arg, .. } => eval(arg, defs, except)?,
        _ => {},
    }

    inline_call(node, defs, except)?;
    substitute_variable(node, defs, except);
    reduce_constants(node);
    fold_node(node)
}

/// Replace a call to a defined function with its body, the formal parameter
/// substituted by the call's argument, and re-reduce the result (the
/// substitution can expose new foldable constants or further calls).
fn inline_call(
    node: &mut Node,
    defs: &Definitions,
    except: Option<&str>,
) -> Result<(), ValueError> {
    let (param, mut body) = match node {
        Node::Call { name, .. } => {
            match defs.get(name.as_str()).map(Expression::root) {
                Some(Node::Binary {
                    op: BinOp::Eq,
                    left,
                    right,
                }) => match &**left {
                    Node::Call { arg, .. } => match &**arg {
                        Node::Variable(param) => {
                            (param.clone(), (**right).clone())
                        },
                        _ => return Ok(()),
                    },
                    _ => return Ok(()),
                },
                _ => return Ok(()),
            }
        },
        _ => return Ok(()),
    };

    let call = std::mem::replace(node, Node::Constant(Value::zero()));
    if let Node::Call { arg, .. } = call {
        substitute(&mut body, &param, &arg);
        *node = body;
    }

    eval(node, defs, except)
}

/// Replace every occurrence of the variable `name` with a copy of
/// `replacement`.
fn substitute(node: &mut Node, name: &str, replacement: &Node) {
    match node {
        Node::Binary { left, right, .. } => {
            substitute(left, name, replacement);
            substitute(right, name, replacement);
        },
        Node::Call { arg, .. } => substitute(arg, name, replacement),
        Node::Variable(var) if var.as_str() == name => {
            *node = replacement.clone();
        },
        _ => {},
    }
}

/// Swap a defined variable for the right-hand side of its binding, unless it
/// is the protected name.
fn substitute_variable(
    node: &mut Node,
    defs: &Definitions,
    except: Option<&str>,
) {
    let replacement = match node {
        Node::Variable(name) if except != Some(name.as_str()) => {
            match defs.get(name.as_str()).map(Expression::root) {
                Some(Node::Binary {
                    op: BinOp::Eq,
                    right,
                    ..
                }) => Some((**right).clone()),
                _ => None,
            }
        },
        _ => None,
    };

    if let Some(new_node) = replacement {
        *node = new_node;
    }
}

/// Fold every scalar constant hanging off the left spine of an additive
/// chain into a single term.
///
/// The spine is walked while it stays `+`/`-`, each constant right operand
/// is accumulated (sign-flipped under `-`) and spliced out. A constant
/// terminal absorbs the total directly; otherwise a non-zero total is
/// re-attached as one trailing term, rendered `- c` rather than `+ -c` when
/// its real part is negative.
///
/// Only left-leaning chains are normalized; right-leaning or mixed trees
/// built by other rewrites may stay partially folded.
fn reduce_constants(node: &mut Node) {
    match node {
        Node::Binary { op, .. } if op.is_additive() => {},
        _ => return,
    }

    let mut total = Complex64::new(0.0, 0.0);
    fold_spine(node, &mut total);

    if total != Complex64::new(0.0, 0.0) {
        let chain = std::mem::replace(node, Node::Constant(Value::zero()));
        let (op, constant) = if total.re < 0.0 {
            (BinOp::Sub, Value::Scalar(-total))
        } else {
            (BinOp::Add, Value::Scalar(total))
        };
        *node = Node::binary(chain, op, Node::Constant(constant));
    }
}

fn fold_spine(node: &mut Node, total: &mut Complex64) {
    loop {
        let hoisted = match node {
            Node::Binary { op, left, right } if op.is_additive() => {
                match &**right {
                    Node::Constant(Value::Scalar(c)) => {
                        *total += if *op == BinOp::Add { *c } else { -*c };
                        Some(std::mem::replace(
                            &mut **left,
                            Node::Constant(Value::zero()),
                        ))
                    },
                    _ => None,
                }
            },
            _ => break,
        };

        match hoisted {
            Some(left) => *node = left,
            None => {
                if let Node::Binary { left, .. } = node {
                    fold_spine(left, total);
                }
                return;
            },
        }
    }

    // the spine ended in this node; a scalar constant absorbs the total
    if let Node::Constant(Value::Scalar(c)) = node {
        *c += *total;
        *total = Complex64::new(0.0, 0.0);
    }
}

/// Constant folding at a single node: built-in calls on constant arguments,
/// the `pi`/`e` constants, binary operators on two constants, and the
/// algebraic identities.
fn fold_node(node: &mut Node) -> Result<(), ValueError> {
    let folded = match node {
        Node::Call { name, arg } => match arg.as_constant() {
            Some(value) => apply_builtin(name.as_str(), value)?,
            None => None,
        },
        Node::Variable(name) => match name.as_str() {
            "pi" => Some(Value::real(PI)),
            "e" => Some(Value::real(E)),
            _ => None,
        },
        Node::Binary { left, op, right } => {
            match (left.as_constant(), right.as_constant()) {
                (Some(a), Some(b)) => apply_binary(*op, a, b)?,
                _ => None,
            }
        },
        Node::Constant(_) => None,
    };

    if let Some(value) = folded {
        *node = Node::Constant(value);
        return Ok(());
    }

    apply_identities(node);
    Ok(())
}

fn apply_builtin(name: &str, value: &Value) -> Result<Option<Value>, ValueError> {
    let result = match name {
        "abs" => value.abs()?,
        "sqrt" => value.sqrt()?,
        "exp" => value.exp()?,
        "ln" => value.ln()?,
        "sin" => value.sin()?,
        "cos" => value.cos()?,
        "tan" => value.tan()?,
        "cot" => value.cot()?,
        "atan" => value.atan()?,
        "torad" => value.deg_to_rad()?,
        "todeg" => value.rad_to_deg()?,
        "det" => value.det()?,
        "cof" => value.cof()?,
        "trans" => value.trans()?,
        "adj" => value.adj()?,
        "inv" => value.inv()?,
        _ => return Ok(None),
    };

    Ok(Some(result))
}

fn apply_binary(
    op: BinOp,
    a: &Value,
    b: &Value,
) -> Result<Option<Value>, ValueError> {
    let result = match op {
        BinOp::Add => a.add(b)?,
        BinOp::Sub => a.sub(b)?,
        BinOp::Mul => a.mul(b)?,
        BinOp::Div => a.div(b)?,
        BinOp::Rem => a.rem(b)?,
        BinOp::Pow => a.pow(b)?,
        BinOp::MatMul => a.matmul(b)?,
        // an equation root is never folded
        BinOp::Eq => return Ok(None),
    };

    Ok(Some(result))
}

fn apply_identities(node: &mut Node) {
    enum Keep {
        Zero,
        Left,
        Right,
    }

    let action = match node {
        Node::Binary {
            left,
            op: BinOp::Mul,
            right,
        } if left.is_constant_eq(&Value::zero())
            || right.is_constant_eq(&Value::zero()) =>
        {
            Keep::Zero
        },
        Node::Binary {
            left,
            op: BinOp::Add,
            ..
        } if left.is_constant_eq(&Value::zero()) => Keep::Right,
        Node::Binary { op, right, .. }
            if op.is_additive() && right.is_constant_eq(&Value::zero()) =>
        {
            Keep::Left
        },
        Node::Binary {
            left,
            op: BinOp::Mul,
            ..
        } if left.is_constant_eq(&Value::one()) => Keep::Right,
        Node::Binary { op, right, .. }
            if matches!(op, BinOp::Mul | BinOp::Div)
                && right.is_constant_eq(&Value::one()) =>
        {
            Keep::Left
        },
        Node::Binary {
            op: BinOp::Pow,
            right,
            ..
        } if right.is_constant_eq(&Value::one()) => Keep::Left,
        _ => return,
    };

    match action {
        Keep::Zero => *node = Node::Constant(Value::zero()),
        Keep::Left => {
            let old = std::mem::replace(node, Node::Constant(Value::zero()));
            if let Node::Binary { left, .. } = old {
                *node = *left;
            }
        },
        Keep::Right => {
            let old = std::mem::replace(node, Node::Constant(Value::zero()));
            if let Node::Binary { right, .. } = old {
                *node = *right;
            }
        },
    }
}
