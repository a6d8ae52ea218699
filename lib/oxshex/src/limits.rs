//! Bounds on the work done by the validator.
//!
//! Validation is exhaustive: shapes may reference each other recursively and the arcs of a node
//! are assigned to triple constraints by a backtracking search. These limits bound both.

/// Default maximum number of nested shape reference evaluations.
pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 100;

/// Default ceiling on the number of arc assignments tried for a single shape.
///
/// The search is only attempted if the product of the choices of every arc is below this value.
pub const DEFAULT_MAX_SEARCH_SPACE: usize = 1024;

/// Default bound on the length of `pattern` facet regular expressions.
pub const DEFAULT_MAX_REGEX_LENGTH: usize = 1000;

/// Bounds on the work done by a [`ShexValidator`](crate::ShexValidator).
///
/// # Examples
///
/// ```
/// use oxshex::ValidationLimits;
///
/// let limits = ValidationLimits::default()
///     .with_max_recursion_depth(50)
///     .with_max_search_space(4096);
/// assert_eq!(limits.max_recursion_depth, 50);
///
/// let trusted = ValidationLimits::permissive();
/// assert!(trusted.max_search_space > limits.max_search_space);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationLimits {
    /// Maximum number of nested shape reference evaluations.
    pub max_recursion_depth: usize,

    /// Number of possible arc assignments at which a shape is reported as too complex.
    pub max_search_space: usize,

    /// Patterns longer than this are rejected.
    pub max_regex_length: usize,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
            max_search_space: DEFAULT_MAX_SEARCH_SPACE,
            max_regex_length: DEFAULT_MAX_REGEX_LENGTH,
        }
    }
}

impl ValidationLimits {
    /// Same as [`Self::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits for trusted schemas. Large search spaces may take a long time.
    pub fn permissive() -> Self {
        Self {
            max_recursion_depth: 500,
            max_search_space: 1 << 20,
            max_regex_length: 10_000,
        }
    }

    /// Limits for schemas coming from untrusted sources.
    pub fn strict() -> Self {
        Self {
            max_recursion_depth: 50,
            max_search_space: 256,
            max_regex_length: 500,
        }
    }

    /// Sets the nesting bound of shape references.
    #[must_use]
    pub fn with_max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = depth;
        self
    }

    /// Sets the search space ceiling.
    #[must_use]
    pub fn with_max_search_space(mut self, size: usize) -> Self {
        self.max_search_space = size;
        self
    }

    /// Sets the pattern length bound.
    #[must_use]
    pub fn with_max_regex_length(mut self, length: usize) -> Self {
        self.max_regex_length = length;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(
            ValidationLimits::new(),
            ValidationLimits {
                max_recursion_depth: 100,
                max_search_space: 1024,
                max_regex_length: 1000,
            }
        );
    }

    #[test]
    fn test_presets_are_ordered() {
        let strict = ValidationLimits::strict();
        let default = ValidationLimits::default();
        let permissive = ValidationLimits::permissive();
        assert!(strict.max_recursion_depth < default.max_recursion_depth);
        assert!(default.max_recursion_depth < permissive.max_recursion_depth);
        assert!(strict.max_search_space < default.max_search_space);
        assert!(default.max_search_space < permissive.max_search_space);
    }

    #[test]
    fn test_builder() {
        let limits = ValidationLimits::strict()
            .with_max_recursion_depth(7)
            .with_max_search_space(8)
            .with_max_regex_length(9);
        assert_eq!(limits.max_recursion_depth, 7);
        assert_eq!(limits.max_search_space, 8);
        assert_eq!(limits.max_regex_length, 9);
    }
}
