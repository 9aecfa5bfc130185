use crate::{
    constants::{DEFAULT_PRIORITY, DEFAULT_ROLE},
    model::Priority,
};

/// Parse-time configuration.
///
/// Defaults for `role` and `priority` are carried here rather than in global
/// state so that differently configured parses can run side by side.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Options {
    /// Role assigned to fields that do not declare `role=...`.
    pub default_role: String,
    /// Priority assigned to fields that do not declare `priority=...`.
    pub default_priority: Priority,
    /// Strict mode - fail on non-conformance instead of warn-and-continue.
    ///
    /// When enabled, issues that would normally result in a warning will
    /// instead cause parsing to fail. For example:
    /// - A `placeholder` that does not parse as the field's type
    pub strict: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            default_role: DEFAULT_ROLE.to_string(),
            default_priority: DEFAULT_PRIORITY,
            strict: false,
        }
    }
}

impl Options {
    /// Create a new `OptionsBuilder` for fluent configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use markform_parser::{Options, Priority};
    ///
    /// let options = Options::builder()
    ///     .with_default_role("user")
    ///     .with_default_priority(Priority::High)
    ///     .build();
    /// ```
    #[must_use]
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder::default()
    }

    /// Create a new `Options` with default settings.
    ///
    /// Equivalent to `Options::default()`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Builder for `Options`.
///
/// Create an `OptionsBuilder` using `Options::builder()`.
#[derive(Debug, Clone, Default)]
#[non_exhaustive]
pub struct OptionsBuilder {
    default_role: Option<String>,
    default_priority: Option<Priority>,
    strict: bool,
}

impl OptionsBuilder {
    /// Set the role given to fields without a `role` attribute.
    #[must_use]
    pub fn with_default_role(mut self, role: impl Into<String>) -> Self {
        self.default_role = Some(role.into());
        self
    }

    /// Set the priority given to fields without a `priority` attribute.
    #[must_use]
    pub fn with_default_priority(mut self, priority: Priority) -> Self {
        self.default_priority = Some(priority);
        self
    }

    /// Enable strict mode.
    ///
    /// When enabled, issues that would normally result in a warning
    /// will instead cause parsing to fail.
    #[must_use]
    pub fn with_strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Build the `Options` from this builder.
    #[must_use]
    pub fn build(self) -> Options {
        let defaults = Options::default();
        Options {
            default_role: self.default_role.unwrap_or(defaults.default_role),
            default_priority: self.default_priority.unwrap_or(defaults.default_priority),
            strict: self.strict,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let options = Options::builder().build();
        assert_eq!(options.default_role, "agent");
        assert_eq!(options.default_priority, Priority::Medium);
        assert!(!options.strict);
    }

    #[test]
    fn test_builder_overrides() {
        let options = Options::builder()
            .with_default_role("user")
            .with_default_priority(Priority::Low)
            .with_strict()
            .build();
        assert_eq!(options.default_role, "user");
        assert_eq!(options.default_priority, Priority::Low);
        assert!(options.strict);
    }
}
