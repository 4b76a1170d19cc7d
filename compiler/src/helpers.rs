//! Caller-supplied helper functions.
//!
//! Helpers extend the function namespace of a tracer system beyond the
//! library kernels. They must be pure: the compiled system calls them from
//! any thread without synchronization.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tidepool_library::MAX_KERNEL_ARITY;

use crate::error::CompileError;

/// Signature of a helper: arguments in call order, one result.
pub type HelperFn = dyn Fn(&[f64]) -> f64 + Send + Sync;

/// A named helper with a fixed arity.
#[derive(Clone)]
pub struct Helper {
    arity: usize,
    function: Arc<HelperFn>,
}

impl Helper {
    /// Number of arguments the helper takes.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.arity
    }

    pub(crate) fn function(&self) -> &Arc<HelperFn> {
        &self.function
    }
}

impl fmt::Debug for Helper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Helper").field("arity", &self.arity).finish()
    }
}

/// The helper-function namespace handed to the compiler.
#[derive(Debug, Clone, Default)]
pub struct HelperFunctions {
    helpers: BTreeMap<String, Helper>,
}

impl HelperFunctions {
    /// An empty namespace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `function` under `name`, replacing any previous helper of
    /// that name.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::HelperArity`] if `arity` exceeds
    /// [`MAX_KERNEL_ARITY`].
    pub fn insert<F>(&mut self, name: impl Into<String>, arity: usize, function: F) -> Result<(), CompileError>
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        let name = name.into();
        if arity > MAX_KERNEL_ARITY {
            return Err(CompileError::HelperArity {
                name,
                arity,
                max: MAX_KERNEL_ARITY,
            });
        }
        self.helpers.insert(
            name,
            Helper {
                arity,
                function: Arc::new(function),
            },
        );
        Ok(())
    }

    /// Builder form of [`insert`](Self::insert).
    ///
    /// # Errors
    ///
    /// Same as [`insert`](Self::insert).
    pub fn with<F>(mut self, name: impl Into<String>, arity: usize, function: F) -> Result<Self, CompileError>
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        self.insert(name, arity, function)?;
        Ok(self)
    }

    /// Looks up a helper.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Helper> {
        self.helpers.get(name)
    }

    /// Iterates helpers in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Helper)> {
        self.helpers.iter().map(|(name, helper)| (name.as_str(), helper))
    }

    /// Number of registered helpers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.helpers.len()
    }

    /// Whether no helper is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.helpers.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn rejects_arity_beyond_the_buffer() {
        let err = HelperFunctions::new()
            .with("wide", MAX_KERNEL_ARITY + 1, |_| 0.0)
            .unwrap_err();
        assert!(matches!(err, CompileError::HelperArity { arity, .. } if arity == MAX_KERNEL_ARITY + 1));
    }

    #[test]
    fn stores_and_calls() {
        let helpers = HelperFunctions::new().with("twice", 1, |a| 2.0 * a[0]).unwrap();
        let h = helpers.get("twice").unwrap();
        assert_eq!(h.arity(), 1);
        assert_eq!((h.function())(&[3.0]), 6.0);
        assert_eq!(helpers.len(), 1);
    }
}
