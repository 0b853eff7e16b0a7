//! The command layer: classifies query lines, owns the definition table and
//! guards its shape invariant.

use crate::{
    expr::{BinOp, Expression, Node},
    format,
    ops::Definitions,
    parse::ParseError,
    solve::{PolySolver, Power, SolverOptions},
    value::ValueError,
};
use smol_str::SmolStr;
use std::fmt::{self, Display, Formatter};

/// Function names reserved for the reduction engine's built-ins.
const BUILT_IN_FUNCS: &[&str] = &[
    "abs", "sqrt", "exp", "ln", "sin", "cos", "tan", "cot", "atan", "torad",
    "todeg", "det", "cof", "trans", "inv", "adj",
];

/// Variable names reserved for the built-in constants.
const BUILT_IN_VARS: &[&str] = &["pi", "e"];

#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    Parse(ParseError),
    Value(ValueError),
    /// The query has the wrong shape for its kind (for example a definition
    /// whose left side is neither a variable nor `name(parameter)`).
    MalformedQuery,
    /// Built-in names cannot be redefined.
    ReservedName(SmolStr),
}

impl From<ParseError> for CommandError {
    fn from(e: ParseError) -> Self { CommandError::Parse(e) }
}

impl From<ValueError> for CommandError {
    fn from(e: ValueError) -> Self { CommandError::Value(e) }
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Parse(inner) => inner.fmt(f),
            CommandError::Value(inner) => inner.fmt(f),
            CommandError::MalformedQuery => write!(f, "incorrect query"),
            CommandError::ReservedName(name) => {
                write!(f, "\"{}\" is a built-in name and can't be redefined", name)
            },
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandError::Parse(inner) => Some(inner),
            CommandError::Value(inner) => Some(inner),
            _ => None,
        }
    }
}

enum QueryKind {
    Define,
    Calculate,
    Solve,
}

/// Classify a command line by its suffix: `... ?` solves, `... =?`
/// calculates, everything else is a definition.
fn classify(command: &str) -> (&str, QueryKind) {
    match command.strip_suffix('?') {
        Some(rest) => {
            let rest = rest.trim_end();
            match rest.strip_suffix('=') {
                Some(calculation) => (calculation, QueryKind::Calculate),
                None => (rest, QueryKind::Solve),
            }
        },
        None => (command, QueryKind::Define),
    }
}

/// An interactive session: a definition table plus the solver options.
///
/// Failed commands leave the table untouched; only a successful definition
/// inserts (or replaces) an entry.
#[derive(Debug, Default)]
pub struct Processor {
    defs: Definitions,
    options: SolverOptions,
}

impl Processor {
    pub fn new() -> Processor { Processor::default() }

    pub fn with_options(options: SolverOptions) -> Processor {
        Processor {
            defs: Definitions::new(),
            options,
        }
    }

    pub fn definitions(&self) -> &Definitions { &self.defs }

    /// Process one command line and render its answer.
    pub fn process(&mut self, command: &str) -> Result<String, CommandError> {
        let command = command.trim();
        if command.is_empty() || command.starts_with('#') {
            return Ok(String::new());
        }
        if command == "ls" {
            return Ok(self.list());
        }

        let (query, kind) = classify(command);
        let mut expr = Expression::new(query)?;

        match kind {
            QueryKind::Define => self.define(expr),
            QueryKind::Calculate => {
                expr.evaluate(&self.defs)?;
                Ok(expr.to_string())
            },
            QueryKind::Solve => {
                expr.evaluate(&self.defs)?;
                self.solve(&expr.to_string())
            },
        }
    }

    /// Validate a definition's shape at the table's write boundary, reduce
    /// its right side, and insert it.
    fn define(&mut self, mut expr: Expression) -> Result<String, CommandError> {
        let (key, param) = match expr.root() {
            Node::Binary {
                op: BinOp::Eq,
                left,
                ..
            } => match &**left {
                Node::Variable(name) => {
                    if BUILT_IN_VARS.contains(&name.as_str()) {
                        return Err(CommandError::ReservedName(name.clone()));
                    }
                    (name.clone(), None)
                },
                Node::Call { name, arg } => {
                    if BUILT_IN_FUNCS.contains(&name.as_str()) {
                        return Err(CommandError::ReservedName(name.clone()));
                    }
                    match &**arg {
                        Node::Variable(param) => (name.clone(), Some(param.clone())),
                        _ => return Err(CommandError::MalformedQuery),
                    }
                },
                _ => return Err(CommandError::MalformedQuery),
            },
            _ => return Err(CommandError::MalformedQuery),
        };

        expr.evaluate_right(&self.defs, param.as_ref().map(SmolStr::as_str))?;

        let rendered = match expr.root() {
            Node::Binary { right, .. } => right.to_string(),
            _ => String::new(),
        };
        self.defs.insert(key, expr);
        Ok(rendered)
    }

    fn solve(&self, equation: &str) -> Result<String, CommandError> {
        let solver = PolySolver::with_options(equation, self.options);

        let mut out = String::new();
        out.push_str(equation);
        out.push('\n');
        out.push_str(solver.message());
        out.push('\n');
        for root in solver.roots() {
            let terms: Vec<(f64, f64)> = root
                .iter()
                .map(|(&Power(power), &value)| (power, value))
                .collect();
            out.push_str(&format::print_polynom(&terms, "i"));
            out.push('\n');
        }

        Ok(out)
    }

    fn list(&self) -> String {
        let mut out = String::new();
        for (name, expr) in &self.defs {
            out.push_str(&format!("  {} : {}\n", name, expr));
        }
        out.push_str(&format!("  {} defines total.\n", self.defs.len()));
        out
    }
}
