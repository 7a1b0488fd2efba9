//! # Exclusion policy.
//!
//! [`Options`] carries the ordered list of predicates ([`ExcludeErrors`]) that decide
//! which errors are not worth reporting. Predicates are OR-combined; evaluation stops
//! at the first match.
//!
//! ## Defaults
//! - `is(Canceled)`
//! - `is(DeadlineExceeded)`
//!
//! ## Configuration
//! Options are built once and immutable afterwards. Two equivalent ways exist:
//! - [`Options::new`] applies boxed configuration functions in order;
//! - [`Options::builder`] gives an explicit [`OptionsBuilder`].
//!
//! In both, later steps see the result of earlier ones, so replacing the list and then
//! appending differs from appending and then replacing.
//!
//! ## Example
//! ```
//! use lifeline::{ErrorKind, Options, TaskError, is_kind};
//!
//! let panicked = is_kind(ErrorKind::Panicked);
//! let opts = Options::builder()
//!     .exclude(move |e: &TaskError| panicked(e))
//!     .build();
//!
//! assert!(opts.is_excluded(&TaskError::Canceled));
//! assert!(opts.is_excluded(&TaskError::Panicked { info: "x".into() }));
//! assert!(!opts.is_excluded(&TaskError::fail("boom")));
//! ```

use std::fmt;
use std::sync::Arc;

use crate::error::{ErrorKind, TaskError};

/// A single exclusion predicate.
pub type ExcludeError = Arc<dyn Fn(&TaskError) -> bool + Send + Sync>;

/// Ordered set of exclusion predicates.
#[derive(Clone, Default)]
pub struct ExcludeErrors(Vec<ExcludeError>);

impl ExcludeErrors {
    /// Creates an empty set (nothing is excluded).
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a predicate.
    pub fn push(&mut self, pred: ExcludeError) {
        self.0.push(pred);
    }

    /// Removes every predicate.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Number of predicates.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no predicates.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if any predicate matches `err`.
    pub fn is_excluded(&self, err: &TaskError) -> bool {
        self.0.iter().any(|pred| pred(err))
    }
}

impl FromIterator<ExcludeError> for ExcludeErrors {
    fn from_iter<I: IntoIterator<Item = ExcludeError>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Debug for ExcludeErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExcludeErrors")
            .field("predicates", &self.0.len())
            .finish()
    }
}

/// Predicate matching errors that [`is`](TaskError::is) `target`.
pub fn is_error(target: TaskError) -> ExcludeError {
    Arc::new(move |err: &TaskError| err.is(&target))
}

/// Predicate matching errors of the given [`ErrorKind`].
pub fn is_kind(kind: ErrorKind) -> ExcludeError {
    Arc::new(move |err: &TaskError| err.kind() == kind)
}

/// Functional configuration step for [`Options::new`].
pub type OptionsFn = Box<dyn FnOnce(&mut Options)>;

/// Reporting behavior of a [`Service`](crate::Service).
#[derive(Clone, Debug)]
pub struct Options {
    /// Errors matching any of these predicates are neither reported nor returned.
    pub exclude_errors: ExcludeErrors,
}

impl Options {
    /// Starts from the defaults and applies `fns` in order.
    ///
    /// # Example
    /// ```
    /// use lifeline::{ExcludeErrors, Options, OptionsFn, TaskError};
    ///
    /// let replace: OptionsFn = Box::new(|o: &mut Options| o.exclude_errors = ExcludeErrors::new());
    /// let opts = Options::new([replace]);
    /// assert!(!opts.is_excluded(&TaskError::Canceled));
    /// ```
    pub fn new(fns: impl IntoIterator<Item = OptionsFn>) -> Self {
        let mut options = Self::default();
        for f in fns {
            f(&mut options);
        }
        options
    }

    /// Returns a builder starting from the defaults.
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder {
            options: Self::default(),
        }
    }

    /// Returns `true` if `err` must not be reported.
    #[inline]
    pub fn is_excluded(&self, err: &TaskError) -> bool {
        self.exclude_errors.is_excluded(err)
    }
}

impl Default for Options {
    /// Excludes cancellation and deadline errors, wrapped or not.
    fn default() -> Self {
        Self {
            exclude_errors: [
                is_error(TaskError::Canceled),
                is_error(TaskError::DeadlineExceeded),
            ]
            .into_iter()
            .collect(),
        }
    }
}

/// Builder for [`Options`]; steps apply in call order.
#[must_use]
pub struct OptionsBuilder {
    options: Options,
}

impl OptionsBuilder {
    /// Appends a predicate.
    pub fn exclude<F>(mut self, pred: F) -> Self
    where
        F: Fn(&TaskError) -> bool + Send + Sync + 'static,
    {
        self.options.exclude_errors.push(Arc::new(pred));
        self
    }

    /// Replaces the whole predicate list.
    pub fn exclude_errors(mut self, list: ExcludeErrors) -> Self {
        self.options.exclude_errors = list;
        self
    }

    /// Applies an arbitrary mutation.
    pub fn configure(mut self, f: impl FnOnce(&mut Options)) -> Self {
        f(&mut self.options);
        self
    }

    /// Finishes the builder.
    pub fn build(self) -> Options {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_exclude_cancellation_class() {
        let opts = Options::default();
        assert_eq!(opts.exclude_errors.len(), 2);
        assert!(opts.is_excluded(&TaskError::Canceled));
        assert!(opts.is_excluded(&TaskError::DeadlineExceeded));
        assert!(opts.is_excluded(&TaskError::Canceled.wrap("shutdown")));
        assert!(!opts.is_excluded(&TaskError::fail("boom")));
        assert!(!opts.is_excluded(&TaskError::Panicked { info: "x".into() }));
    }

    #[test]
    fn test_new_applies_fns_in_order() {
        let append: OptionsFn = Box::new(|o: &mut Options| {
            o.exclude_errors.push(is_error(TaskError::fail("noise")));
        });
        let replace: OptionsFn = Box::new(|o: &mut Options| {
            o.exclude_errors = [is_kind(ErrorKind::Panicked)].into_iter().collect();
        });

        let opts = Options::new([append, replace]);
        assert_eq!(opts.exclude_errors.len(), 1);
        assert!(!opts.is_excluded(&TaskError::fail("noise")));
        assert!(!opts.is_excluded(&TaskError::Canceled));
        assert!(opts.is_excluded(&TaskError::Panicked { info: "x".into() }));
    }

    #[test]
    fn test_builder_replace_then_append() {
        let opts = Options::builder()
            .exclude_errors(ExcludeErrors::new())
            .exclude(|e| e.to_string().contains("noise"))
            .build();

        assert_eq!(opts.exclude_errors.len(), 1);
        assert!(opts.is_excluded(&TaskError::fail("some noise")));
        assert!(!opts.is_excluded(&TaskError::Canceled));
    }

    #[test]
    fn test_builder_append_then_replace() {
        let opts = Options::builder()
            .exclude(|e| e.to_string().contains("noise"))
            .exclude_errors(ExcludeErrors::new())
            .build();

        assert!(opts.exclude_errors.is_empty());
        assert!(!opts.is_excluded(&TaskError::fail("some noise")));
    }

    #[test]
    fn test_configure_clear() {
        let opts = Options::builder()
            .configure(|o| o.exclude_errors.clear())
            .build();
        assert!(!opts.is_excluded(&TaskError::DeadlineExceeded));
    }
}
