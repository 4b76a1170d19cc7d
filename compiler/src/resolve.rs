//! Name resolution.
//!
//! Two namespaces: values (coordinates, parameters, tracers, auxiliary
//! fields) and functions (library kernels, helpers). Each name lives in
//! exactly one slot of its namespace; the table is built once per
//! compilation and every expression is checked against it before any of
//! them is lowered.

use std::collections::HashMap;

use tidepool_library::{find_kernel, KernelSpec};

use crate::coordinates::Coordinate;
use crate::error::{CompileError, DeclarationRole};
use crate::expr::Expr;
use crate::helpers::{Helper, HelperFunctions};

/// Where a value symbol is read from at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    Coordinate(Coordinate),
    Parameter(usize),
    Tracer(usize),
    Auxiliary(usize),
}

/// What a call site invokes.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Callable<'a> {
    Kernel(&'static KernelSpec),
    Helper(&'a Helper),
}

impl Callable<'_> {
    pub(crate) fn arity(&self) -> usize {
        match self {
            Callable::Kernel(k) => k.arity(),
            Callable::Helper(h) => h.arity(),
        }
    }
}

pub(crate) struct SymbolTable<'a> {
    values: HashMap<&'a str, (Slot, DeclarationRole)>,
    helpers: &'a HelperFunctions,
}

impl<'a> SymbolTable<'a> {
    /// Builds the table, rejecting reserved and duplicated declarations.
    pub(crate) fn build(
        parameters: impl IntoIterator<Item = &'a str>,
        tracers: impl IntoIterator<Item = &'a str>,
        auxiliary_fields: impl IntoIterator<Item = &'a str>,
        helpers: &'a HelperFunctions,
    ) -> Result<Self, CompileError> {
        let mut table = SymbolTable {
            values: HashMap::new(),
            helpers,
        };
        for (i, name) in parameters.into_iter().enumerate() {
            table.declare(name, Slot::Parameter(i), DeclarationRole::Parameter)?;
        }
        for (i, name) in tracers.into_iter().enumerate() {
            table.declare(name, Slot::Tracer(i), DeclarationRole::Tracer)?;
        }
        for (i, name) in auxiliary_fields.into_iter().enumerate() {
            table.declare(name, Slot::Auxiliary(i), DeclarationRole::AuxiliaryField)?;
        }
        for (name, _) in helpers.iter() {
            if Coordinate::from_name(name).is_some() {
                return Err(CompileError::ReservedName {
                    name: name.to_owned(),
                    role: DeclarationRole::HelperFunction,
                });
            }
            if let Some(kernel) = find_kernel(name) {
                return Err(CompileError::AmbiguousName {
                    name: kernel.name.to_owned(),
                    first: DeclarationRole::Kernel,
                    second: DeclarationRole::HelperFunction,
                });
            }
            // Bare symbols may name helpers, so helpers share the value namespace.
            if let Some(&(_, first)) = table.values.get(name) {
                return Err(CompileError::AmbiguousName {
                    name: name.to_owned(),
                    first,
                    second: DeclarationRole::HelperFunction,
                });
            }
        }
        Ok(table)
    }

    fn declare(&mut self, name: &'a str, slot: Slot, role: DeclarationRole) -> Result<(), CompileError> {
        if Coordinate::from_name(name).is_some() {
            return Err(CompileError::ReservedName {
                name: name.to_owned(),
                role,
            });
        }
        if let Some((_, first)) = self.values.insert(name, (slot, role)) {
            return Err(CompileError::AmbiguousName {
                name: name.to_owned(),
                first,
                second: role,
            });
        }
        Ok(())
    }

    pub(crate) fn value(&self, name: &str) -> Option<Slot> {
        Coordinate::from_name(name)
            .map(Slot::Coordinate)
            .or_else(|| self.values.get(name).map(|(slot, _)| *slot))
    }

    pub(crate) fn function(&self, name: &str) -> Option<Callable<'a>> {
        find_kernel(name)
            .map(Callable::Kernel)
            .or_else(|| self.helpers.get(name).map(Callable::Helper))
    }

    /// Checks every symbol and call in `expr`, the expression of `tracer`.
    ///
    /// A bare symbol naming a zero-argument helper is accepted as a call.
    pub(crate) fn check(&self, tracer: &str, expr: &Expr) -> Result<(), CompileError> {
        match expr {
            Expr::Literal(_) => Ok(()),
            Expr::Symbol(name) => {
                if self.value(name).is_some() {
                    return Ok(());
                }
                match self.helpers.get(name) {
                    Some(helper) if helper.arity() == 0 => Ok(()),
                    Some(helper) => Err(CompileError::ArityMismatch {
                        function: name.clone(),
                        tracer: tracer.to_owned(),
                        expected: helper.arity(),
                        found: 0,
                    }),
                    None => Err(CompileError::UnresolvedSymbol {
                        symbol: name.clone(),
                        tracer: tracer.to_owned(),
                    }),
                }
            }
            Expr::Unary { operand, .. } => self.check(tracer, operand),
            Expr::Binary { lhs, rhs, .. } => {
                self.check(tracer, lhs)?;
                self.check(tracer, rhs)
            }
            Expr::Call { function, args } => {
                let callable = self.function(function).ok_or_else(|| CompileError::UnknownFunction {
                    function: function.clone(),
                    tracer: tracer.to_owned(),
                })?;
                if callable.arity() != args.len() {
                    return Err(CompileError::ArityMismatch {
                        function: function.clone(),
                        tracer: tracer.to_owned(),
                        expected: callable.arity(),
                        found: args.len(),
                    });
                }
                args.iter().try_for_each(|arg| self.check(tracer, arg))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn table<'a>(helpers: &'a HelperFunctions) -> Result<SymbolTable<'a>, CompileError> {
        SymbolTable::build(["a", "b"], ["N", "P"], ["PAR"], helpers)
    }

    #[test]
    fn resolves_every_namespace() {
        let helpers = HelperFunctions::new();
        let t = table(&helpers).unwrap();
        assert_eq!(t.value("b"), Some(Slot::Parameter(1)));
        assert_eq!(t.value("P"), Some(Slot::Tracer(1)));
        assert_eq!(t.value("PAR"), Some(Slot::Auxiliary(0)));
        assert_eq!(t.value("z"), Some(Slot::Coordinate(Coordinate::Z)));
        assert!(t.function("monod_limitation").is_some());
        assert_eq!(t.value("c"), None);
    }

    #[test]
    fn coordinate_names_are_reserved() {
        let helpers = HelperFunctions::new();
        let err = SymbolTable::build(["t"], ["N"], std::iter::empty(), &helpers).err().unwrap();
        assert_eq!(
            err,
            CompileError::ReservedName {
                name: "t".into(),
                role: DeclarationRole::Parameter
            }
        );
        assert_eq!(err.kind(), ErrorKind::NameResolution);
    }

    #[test]
    fn duplicate_declarations_are_ambiguous() {
        let helpers = HelperFunctions::new();
        let err = SymbolTable::build(["N"], ["N"], std::iter::empty(), &helpers).err().unwrap();
        assert!(matches!(
            err,
            CompileError::AmbiguousName {
                first: DeclarationRole::Parameter,
                second: DeclarationRole::Tracer,
                ..
            }
        ));
    }

    #[test]
    fn helpers_may_not_shadow_kernels() {
        let helpers = HelperFunctions::new().with("exp", 1, |a| a[0]).unwrap();
        assert!(matches!(
            table(&helpers).err().unwrap(),
            CompileError::AmbiguousName { second: DeclarationRole::HelperFunction, .. }
        ));
    }

    #[test]
    fn check_reports_symbol_and_tracer() {
        let helpers = HelperFunctions::new();
        let t = table(&helpers).unwrap();
        let e: Expr = "a * N - q".parse().unwrap();
        assert_eq!(
            t.check("P", &e).unwrap_err(),
            CompileError::UnresolvedSymbol {
                symbol: "q".into(),
                tracer: "P".into()
            }
        );
        let e: Expr = "monod_limitation(N)".parse().unwrap();
        assert!(matches!(
            t.check("P", &e).unwrap_err(),
            CompileError::ArityMismatch { expected: 2, found: 1, .. }
        ));
        let e: Expr = "nope(N)".parse().unwrap();
        assert!(matches!(t.check("N", &e).unwrap_err(), CompileError::UnknownFunction { .. }));
    }

    #[test]
    fn zero_arity_helpers_read_as_symbols() {
        let helpers = HelperFunctions::new()
            .with("temperature", 0, |_| 12.0)
            .unwrap()
            .with("q10", 1, |a| a[0])
            .unwrap();
        let t = table(&helpers).unwrap();
        assert!(t.check("N", &"a * temperature".parse().unwrap()).is_ok());
        assert!(matches!(
            t.check("N", &"q10".parse().unwrap()).unwrap_err(),
            CompileError::ArityMismatch { expected: 1, found: 0, .. }
        ));
    }
}
