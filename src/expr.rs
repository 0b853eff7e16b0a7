//! The expression tree and its text renderings.

use crate::{
    ops::{self, Definitions},
    parse::{self, ParseError},
    value::{Value, ValueError},
};
use smol_str::SmolStr;
use std::{
    collections::BTreeSet,
    fmt::{self, Display, Formatter},
    str::FromStr,
};

/// An operation joining two operands.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    MatMul,
    /// The equation (or definition) separator.
    Eq,
}

impl BinOp {
    pub(crate) fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::Pow => "^",
            BinOp::MatMul => "**",
            BinOp::Eq => "=",
        }
    }

    pub(crate) fn is_additive(self) -> bool {
        matches!(self, BinOp::Add | BinOp::Sub)
    }

    /// The operators that force parentheses around an additive child.
    fn is_tight(self) -> bool {
        matches!(
            self,
            BinOp::Mul | BinOp::Div | BinOp::Rem | BinOp::Pow | BinOp::MatMul
        )
    }
}

/// A node in an expression tree.
///
/// Every node owns its operands exclusively; the tree has no sharing and no
/// cycles, so cloning is a deep copy and teardown is a recursive drop.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Constant(Value),
    Variable(SmolStr),
    /// A single-argument function call.
    Call { name: SmolStr, arg: Box<Node> },
    Binary {
        left: Box<Node>,
        op: BinOp,
        right: Box<Node>,
    },
}

impl Node {
    pub(crate) fn binary(left: Node, op: BinOp, right: Node) -> Node {
        Node::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn as_constant(&self) -> Option<&Value> {
        match self {
            Node::Constant(value) => Some(value),
            _ => None,
        }
    }

    pub(crate) fn is_constant_eq(&self, value: &Value) -> bool {
        matches!(self, Node::Constant(v) if v == value)
    }

    fn write_infix(
        &self,
        f: &mut Formatter<'_>,
        parent: Option<BinOp>,
        is_right: bool,
    ) -> fmt::Result {
        match self {
            Node::Call { name, arg } => {
                if name.as_str() == "abs" {
                    f.write_str("|")?;
                    arg.write_infix(f, None, false)?;
                    f.write_str("|")
                } else {
                    write!(f, "{}(", name)?;
                    arg.write_infix(f, None, false)?;
                    f.write_str(")")
                }
            },
            Node::Constant(value) => {
                let tight_parent = matches!(
                    parent,
                    Some(op) if op.is_tight() || op == BinOp::Sub
                );
                if tight_parent && value.has_visible_imaginary() {
                    write!(f, "({})", value)
                } else {
                    write!(f, "{}", value)
                }
            },
            Node::Variable(name) => f.write_str(name),
            Node::Binary { left, op, right } => {
                let par = (matches!(parent, Some(p) if p.is_tight())
                    && op.is_additive())
                    || (is_right
                        && parent == Some(BinOp::Sub)
                        && *op == BinOp::Add);

                if par {
                    f.write_str("(")?;
                }
                left.write_infix(f, Some(*op), false)?;
                if *op == BinOp::Pow {
                    f.write_str(op.symbol())?;
                } else {
                    write!(f, " {} ", op.symbol())?;
                }
                right.write_infix(f, Some(*op), true)?;
                if par {
                    f.write_str(")")?;
                }
                Ok(())
            },
        }
    }

    fn tree_print_into(&self, indent: usize, out: &mut String) {
        let pad = "  ".repeat(indent);
        match self {
            Node::Constant(value) => {
                out.push_str(&pad);
                out.push_str(&value.tree_form());
                out.push('\n');
            },
            Node::Variable(name) => {
                out.push_str(&pad);
                out.push_str(name);
                out.push('\n');
            },
            Node::Call { name, arg } => {
                out.push_str(&pad);
                out.push_str(name);
                out.push('\n');
                arg.tree_print_into(indent + 1, out);
            },
            Node::Binary { left, op, right } => {
                right.tree_print_into(indent + 1, out);
                out.push_str(&pad);
                out.push_str(op.symbol());
                out.push('\n');
                left.tree_print_into(indent + 1, out);
            },
        }
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.write_infix(f, None, false)
    }
}

/// A parsed expression: an owned tree plus the set of free variable names
/// appearing in it.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    root: Node,
    vars: BTreeSet<SmolStr>,
}

impl Expression {
    /// Parse `text` into an owned tree, or fail without retaining anything.
    pub fn new(text: &str) -> Result<Expression, ParseError> {
        Ok(Expression::from_root(parse::parse(text)?))
    }

    pub(crate) fn from_root(root: Node) -> Expression {
        let mut vars = BTreeSet::new();
        collect_vars(&root, &mut vars);
        Expression { root, vars }
    }

    pub fn root(&self) -> &Node { &self.root }

    /// The free variable names appearing in the tree.
    pub fn vars(&self) -> &BTreeSet<SmolStr> { &self.vars }

    /// Normalize an equation `L = R` into `L - R = 0`, unless the right side
    /// is already the zero constant. Anything without an `=` root is left
    /// alone.
    pub fn reduce(&mut self) {
        let rewrite = match &self.root {
            Node::Binary {
                op: BinOp::Eq,
                right,
                ..
            } => !right.is_constant_eq(&Value::zero()),
            _ => false,
        };
        if !rewrite {
            return;
        }

        let old = std::mem::replace(&mut self.root, Node::Constant(Value::zero()));
        if let Node::Binary { left, right, .. } = old {
            let difference = Node::Binary {
                left,
                op: BinOp::Sub,
                right,
            };
            self.root = Node::binary(
                difference,
                BinOp::Eq,
                Node::Constant(Value::zero()),
            );
        }
    }

    /// Reduce the whole tree against `defs`.
    ///
    /// On error the tree may already be partially rewritten; the caller is
    /// expected to discard the expression rather than keep using it.
    pub fn evaluate(&mut self, defs: &Definitions) -> Result<(), ValueError> {
        ops::eval(&mut self.root, defs, None)?;
        self.recollect_vars();
        Ok(())
    }

    /// Reduce only the right side of the root, shielding `except` from
    /// substitution.
    ///
    /// Used when a definition may refer to its own prior value or, for a
    /// function, to its formal parameter.
    pub fn evaluate_right(
        &mut self,
        defs: &Definitions,
        except: Option<&str>,
    ) -> Result<(), ValueError> {
        if let Node::Binary { right, .. } = &mut self.root {
            ops::eval(right, defs, except)?;
        }
        self.recollect_vars();
        Ok(())
    }

    /// Indented diagnostic rendering: right operands above their operator,
    /// left operands below, two spaces per depth level.
    pub fn tree_print(&self) -> String {
        let mut out = String::new();
        self.root.tree_print_into(0, &mut out);
        out
    }

    fn recollect_vars(&mut self) {
        self.vars.clear();
        collect_vars(&self.root, &mut self.vars);
    }
}

impl FromStr for Expression {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { Expression::new(s) }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.root.fmt(f)
    }
}

fn collect_vars(node: &Node, vars: &mut BTreeSet<SmolStr>) {
    match node {
        Node::Variable(name) => {
            vars.insert(name.clone());
        },
        Node::Call { arg, .. } => collect_vars(arg, vars),
        Node::Binary { left, right, .. } => {
            collect_vars(left, vars);
            collect_vars(right, vars);
        },
        Node::Constant(_) => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let inputs = vec![
            (Node::Constant(Value::real(3.0)), "3"),
            (Node::Variable(SmolStr::new("x")), "x"),
            (
                Node::Call {
                    name: SmolStr::new("sin"),
                    arg: Box::new(Node::Variable(SmolStr::new("x"))),
                },
                "sin(x)",
            ),
            (
                Node::Call {
                    name: SmolStr::new("abs"),
                    arg: Box::new(Node::Constant(Value::real(-5.0))),
                },
                "|-5|",
            ),
            (
                Node::binary(
                    Node::Constant(Value::real(1.0)),
                    BinOp::Add,
                    Node::Constant(Value::real(1.0)),
                ),
                "1 + 1",
            ),
            (
                Node::binary(
                    Node::Constant(Value::real(5.0)),
                    BinOp::Mul,
                    Node::Constant(Value::complex(2.0, 3.0)),
                ),
                "5 * (2 + 3i)",
            ),
            (
                Node::binary(
                    Node::Constant(Value::complex(2.0, 3.0)),
                    BinOp::Add,
                    Node::Variable(SmolStr::new("x")),
                ),
                "2 + 3i + x",
            ),
            (
                Node::binary(
                    Node::Variable(SmolStr::new("x")),
                    BinOp::Sub,
                    Node::Constant(Value::complex(3.0, -2.0)),
                ),
                "x - (3 - 2i)",
            ),
        ];

        for (node, should_be) in inputs {
            assert_eq!(node.to_string(), should_be);
        }
    }

    #[test]
    fn precedence_parenthesization_round_trips() {
        let inputs = vec![
            ("(1 + 2) * 3", "(1 + 2) * 3"),
            ("1 - (2 + 3)", "1 - (2 + 3)"),
            ("1 + 2 * 3", "1 + 2 * 3"),
            ("(x + 1) / (x - 1)", "(x + 1) / (x - 1)"),
            ("2^3^2", "2^3^2"),
            ("(a + b) ** c", "(a + b) ** c"),
            ("(1 + x) % 2", "(1 + x) % 2"),
        ];

        for (src, should_be) in inputs {
            let expr: Expression = src.parse().unwrap();
            assert_eq!(expr.to_string(), should_be);
        }
    }

    #[test]
    fn clones_are_deep_and_equal() {
        let original: Expression = "x + sin(y) * [[1,2];[3,4]]".parse().unwrap();
        let copy = original.clone();

        assert_eq!(original, copy);
    }

    #[test]
    fn free_variables() {
        let expr: Expression = "x + Y * sin(z) + f(w)".parse().unwrap();
        let vars: Vec<&str> = expr.vars().iter().map(|s| s.as_str()).collect();

        // function names are not variables; everything is lowercased
        assert_eq!(vars, vec!["w", "x", "y", "z"]);
    }

    #[test]
    fn reduce_moves_the_right_side_over() {
        let mut expr: Expression = "x = 5".parse().unwrap();
        expr.reduce();
        assert_eq!(expr.to_string(), "x - 5 = 0");

        // already normalized
        let mut expr: Expression = "x - 5 = 0".parse().unwrap();
        expr.reduce();
        assert_eq!(expr.to_string(), "x - 5 = 0");

        // not an equation
        let mut expr: Expression = "x - 5".parse().unwrap();
        expr.reduce();
        assert_eq!(expr.to_string(), "x - 5");
    }

    #[test]
    fn tree_printing() {
        let expr: Expression = "1 + x * 2".parse().unwrap();
        let should_be = "    2\n  *\n    x\n+\n  1\n";

        assert_eq!(expr.tree_print(), should_be);
    }

    #[test]
    fn tree_printing_leaves() {
        let expr: Expression = "f([[1,2];[3,4]])".parse().unwrap();
        let should_be = "f\n  [[ 1 , 2 ];[ 3 , 4 ]]\n";

        assert_eq!(expr.tree_print(), should_be);
    }
}
