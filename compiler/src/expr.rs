//! Symbolic tracer expressions.
//!
//! An [`Expr`] is plain data: a tree of literals, symbol references, unary
//! and binary operators and named calls. Expressions are built with the
//! arithmetic operators, the constructors below, or parsed from text with
//! [`str::parse`].
//!
//! ```
//! use tidepool_compiler::Expr;
//!
//! let alpha = Expr::symbol("alpha");
//! let r = Expr::symbol("R");
//! let built = alpha * r.clone() - Expr::symbol("beta") * r * Expr::symbol("F");
//! let parsed: Expr = "alpha * R - beta * R * F".parse().unwrap();
//! assert_eq!(built, parsed);
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::parse::{parse, ParseError};

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Arithmetic negation.
    Neg,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `^`, right associative.
    Pow,
}

impl BinaryOp {
    /// Applies the operator to two values.
    #[must_use]
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            BinaryOp::Add => lhs + rhs,
            BinaryOp::Sub => lhs - rhs,
            BinaryOp::Mul => lhs * rhs,
            BinaryOp::Div => lhs / rhs,
            BinaryOp::Pow => lhs.powf(rhs),
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
        }
    }

    fn precedence(self) -> u8 {
        match self {
            BinaryOp::Add | BinaryOp::Sub => 1,
            BinaryOp::Mul | BinaryOp::Div => 2,
            BinaryOp::Pow => 4,
        }
    }
}

const NEG_PRECEDENCE: u8 = 3;
const ATOM_PRECEDENCE: u8 = 5;

/// A symbolic expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A numeric constant.
    Literal(f64),
    /// A reference to a coordinate, parameter, tracer or auxiliary field.
    Symbol(String),
    /// A unary operation.
    Unary {
        /// The operator.
        op: UnaryOp,
        /// Its operand.
        operand: Box<Expr>,
    },
    /// A binary operation.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
    /// A call to a library kernel or helper function.
    Call {
        /// Called name.
        function: String,
        /// Arguments in call order.
        args: Vec<Expr>,
    },
}

impl Expr {
    /// A numeric literal.
    #[must_use]
    pub fn literal(value: f64) -> Self {
        Expr::Literal(value)
    }

    /// A symbol reference.
    #[must_use]
    pub fn symbol(name: impl Into<String>) -> Self {
        Expr::Symbol(name.into())
    }

    /// A call of `function` with `args`.
    #[must_use]
    pub fn call(function: impl Into<String>, args: impl IntoIterator<Item = Expr>) -> Self {
        Expr::Call {
            function: function.into(),
            args: args.into_iter().collect(),
        }
    }

    /// `self ^ exponent`
    #[must_use]
    pub fn pow(self, exponent: Expr) -> Self {
        Expr::binary(BinaryOp::Pow, self, exponent)
    }

    /// Builds a binary node.
    #[must_use]
    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Left-folded sum of `terms`; the empty sum is the literal 0.
    #[must_use]
    pub fn sum(terms: impl IntoIterator<Item = Expr>) -> Self {
        terms
            .into_iter()
            .reduce(|acc, term| acc + term)
            .unwrap_or(Expr::Literal(0.0))
    }

    /// Returns every symbol referenced as a value (not as a call target).
    #[must_use]
    pub fn free_symbols(&self) -> BTreeSet<&str> {
        let mut out = BTreeSet::new();
        self.visit(&mut |e| {
            if let Expr::Symbol(name) = e {
                out.insert(name.as_str());
            }
        });
        out
    }

    /// Returns every called function name.
    #[must_use]
    pub fn functions(&self) -> BTreeSet<&str> {
        let mut out = BTreeSet::new();
        self.visit(&mut |e| {
            if let Expr::Call { function, .. } = e {
                out.insert(function.as_str());
            }
        });
        out
    }

    /// Pre-order traversal.
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a Expr)) {
        f(self);
        match self {
            Expr::Literal(_) | Expr::Symbol(_) => {}
            Expr::Unary { operand, .. } => operand.visit(f),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.visit(f);
                rhs.visit(f);
            }
            Expr::Call { args, .. } => {
                for arg in args {
                    arg.visit(f);
                }
            }
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Literal(v) if v.is_finite() && v.is_sign_negative() => NEG_PRECEDENCE,
            Expr::Literal(_) | Expr::Symbol(_) | Expr::Call { .. } => ATOM_PRECEDENCE,
            Expr::Unary { .. } => NEG_PRECEDENCE,
            Expr::Binary { op, .. } => op.precedence(),
        }
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::Literal(value)
    }
}

impl Add for Expr {
    type Output = Expr;
    fn add(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Add, self, rhs)
    }
}

impl Sub for Expr {
    type Output = Expr;
    fn sub(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Sub, self, rhs)
    }
}

impl Mul for Expr {
    type Output = Expr;
    fn mul(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Mul, self, rhs)
    }
}

impl Div for Expr {
    type Output = Expr;
    fn div(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Div, self, rhs)
    }
}

impl Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::Unary {
            op: UnaryOp::Neg,
            operand: Box::new(self),
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, e: &Expr, parenthesize: bool) -> fmt::Result {
    if parenthesize {
        write!(f, "({e})")
    } else {
        write!(f, "{e}")
    }
}

fn is_negative_literal(e: &Expr) -> bool {
    matches!(e, Expr::Literal(v) if v.is_finite() && v.is_sign_negative())
}

/// Prints with the minimum parentheses needed to parse back to the same tree,
/// plus parentheses around negative literals on the right of an operator.
///
/// Non-finite literals print as the quotient that evaluates to them, e.g.
/// `(1 / 0)`; that text evaluates the same but parses to a division.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(v) if v.is_nan() => f.write_str("(0 / 0)"),
            Expr::Literal(v) if v.is_infinite() => {
                f.write_str(if *v > 0.0 { "(1 / 0)" } else { "(-1 / 0)" })
            }
            Expr::Literal(v) => write!(f, "{v}"),
            Expr::Symbol(name) => f.write_str(name),
            Expr::Unary {
                op: UnaryOp::Neg,
                operand,
            } => {
                f.write_str("-")?;
                // `-1.5` would read back as a literal.
                let literal = matches!(**operand, Expr::Literal(v) if v.is_finite());
                write_operand(f, operand, literal || operand.precedence() < NEG_PRECEDENCE)
            }
            Expr::Binary { op, lhs, rhs } => {
                let p = op.precedence();
                let (lhs_parens, rhs_parens) = if *op == BinaryOp::Pow {
                    (lhs.precedence() <= p, rhs.precedence() < NEG_PRECEDENCE)
                } else {
                    (lhs.precedence() < p, rhs.precedence() <= p)
                };
                let rhs_parens = rhs_parens || is_negative_literal(rhs);
                write_operand(f, lhs, lhs_parens)?;
                write!(f, " {} ", op.symbol())?;
                write_operand(f, rhs, rhs_parens)
            }
            Expr::Call { function, args } => {
                write!(f, "{function}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl FromStr for Expr {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Serializes as the [`Display`](fmt::Display) text.
///
/// Fails on non-finite literals, which have no text form that parses back
/// to a literal.
impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut non_finite = None;
        self.visit(&mut |e| {
            if let Expr::Literal(v) = e {
                if !v.is_finite() {
                    non_finite.get_or_insert(*v);
                }
            }
        });
        if let Some(v) = non_finite {
            return Err(serde::ser::Error::custom(format!(
                "literal `{v}` has no text form"
            )));
        }
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Expr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
