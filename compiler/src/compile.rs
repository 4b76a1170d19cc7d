//! Lowering of checked expressions into slot-resolved evaluation trees.

use std::fmt;
use std::sync::Arc;

use tidepool_library::{KernelFn, MAX_KERNEL_ARITY};

use crate::coordinates::{Coordinate, Coordinates};
use crate::expr::{BinaryOp, Expr, UnaryOp};
use crate::helpers::HelperFn;
use crate::resolve::{Callable, Slot, SymbolTable};

/// Inputs visible to a node during evaluation.
#[derive(Clone, Copy)]
pub(crate) struct Frame<'a> {
    pub(crate) coordinates: &'a Coordinates,
    pub(crate) parameters: &'a [f64],
    pub(crate) tracers: &'a [f64],
    pub(crate) auxiliary: &'a [f64],
}

/// A resolved expression. Names are gone; every leaf is a constant or an
/// index into one of the frame's slices.
#[derive(Clone)]
pub(crate) enum Node {
    Constant(f64),
    Coordinate(Coordinate),
    Parameter(usize),
    Tracer(usize),
    Auxiliary(usize),
    Neg(Box<Node>),
    Binary(BinaryOp, Box<Node>, Box<Node>),
    Kernel(KernelFn, Vec<Node>),
    Helper(Arc<HelperFn>, Vec<Node>),
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Constant(v) => write!(f, "{v}"),
            Node::Coordinate(c) => f.write_str(c.name()),
            Node::Parameter(i) => write!(f, "p[{i}]"),
            Node::Tracer(i) => write!(f, "c[{i}]"),
            Node::Auxiliary(i) => write!(f, "aux[{i}]"),
            Node::Neg(n) => write!(f, "-({n:?})"),
            Node::Binary(op, l, r) => write!(f, "({l:?} {op:?} {r:?})"),
            Node::Kernel(_, args) => f.debug_tuple("kernel").field(args).finish(),
            Node::Helper(_, args) => f.debug_tuple("helper").field(args).finish(),
        }
    }
}

fn read(values: &[f64], index: usize) -> f64 {
    values.get(index).copied().unwrap_or(f64::NAN)
}

impl Node {
    /// Lowers `expr`, which must already have passed
    /// [`SymbolTable::check`]. Subtrees made only of literals and library
    /// kernels are folded to constants.
    pub(crate) fn lower(expr: &Expr, table: &SymbolTable<'_>) -> Node {
        match expr {
            Expr::Literal(v) => Node::Constant(*v),
            Expr::Symbol(name) => match table.value(name) {
                Some(Slot::Coordinate(c)) => Node::Coordinate(c),
                Some(Slot::Parameter(i)) => Node::Parameter(i),
                Some(Slot::Tracer(i)) => Node::Tracer(i),
                Some(Slot::Auxiliary(i)) => Node::Auxiliary(i),
                None => match table.function(name) {
                    Some(Callable::Helper(h)) => Node::Helper(Arc::clone(h.function()), Vec::new()),
                    _ => Node::Constant(f64::NAN),
                },
            },
            Expr::Unary {
                op: UnaryOp::Neg,
                operand,
            } => match Node::lower(operand, table) {
                Node::Constant(v) => Node::Constant(-v),
                inner => Node::Neg(Box::new(inner)),
            },
            Expr::Binary { op, lhs, rhs } => {
                match (Node::lower(lhs, table), Node::lower(rhs, table)) {
                    (Node::Constant(a), Node::Constant(b)) => Node::Constant(op.apply(a, b)),
                    (l, r) => Node::Binary(*op, Box::new(l), Box::new(r)),
                }
            }
            Expr::Call { function, args } => {
                let args: Vec<Node> = args.iter().map(|a| Node::lower(a, table)).collect();
                match table.function(function) {
                    Some(Callable::Kernel(kernel)) => {
                        match constant_args(&args).and_then(|values| kernel.call(&values)) {
                            Some(v) => Node::Constant(v),
                            None => Node::Kernel(kernel.function, args),
                        }
                    }
                    Some(Callable::Helper(h)) => Node::Helper(Arc::clone(h.function()), args),
                    None => Node::Constant(f64::NAN),
                }
            }
        }
    }

    pub(crate) fn eval(&self, frame: &Frame<'_>) -> f64 {
        match self {
            Node::Constant(v) => *v,
            Node::Coordinate(c) => frame.coordinates.get(*c),
            Node::Parameter(i) => read(frame.parameters, *i),
            Node::Tracer(i) => read(frame.tracers, *i),
            Node::Auxiliary(i) => read(frame.auxiliary, *i),
            Node::Neg(n) => -n.eval(frame),
            Node::Binary(op, l, r) => op.apply(l.eval(frame), r.eval(frame)),
            Node::Kernel(function, args) => call(args, frame, |a| function(a)),
            Node::Helper(function, args) => call(args, frame, |a| function(a)),
        }
    }
}

fn constant_args(args: &[Node]) -> Option<Vec<f64>> {
    args.iter()
        .map(|a| match a {
            Node::Constant(v) => Some(*v),
            _ => None,
        })
        .collect()
}

/// Evaluates `args` into a stack buffer and applies `f`.
fn call(args: &[Node], frame: &Frame<'_>, f: impl Fn(&[f64]) -> f64) -> f64 {
    let mut buffer = [0.0; MAX_KERNEL_ARITY];
    for (slot, arg) in buffer.iter_mut().zip(args) {
        *slot = arg.eval(frame);
    }
    f(&buffer[..args.len().min(MAX_KERNEL_ARITY)])
}
