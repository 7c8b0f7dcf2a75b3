//! Sub-command patterns.
//!
//! A pattern is a `|`-separated list of literal alternatives, such as
//! `"sub|test"`. It matches a lower-cased argument token only when the whole
//! token equals one of the alternatives; `"testing"` does not match `"test"`.

use std::fmt;
use std::sync::Arc;

use regex::{Regex, RegexBuilder};

use crate::command::executor::CommandExecutor;
use crate::error::{CommandError, CommandResult};

/// A compiled `|`-separated list of literal alternatives.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    alternatives: Vec<String>,
    regex: Regex,
}

impl Pattern {
    /// Compiles `source`.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InvalidPattern`] when the pattern is empty or
    /// contains an empty or whitespace-containing alternative.
    pub fn compile(source: &str) -> CommandResult<Self> {
        if source.trim().is_empty() {
            return Err(CommandError::invalid_pattern(source, "pattern is empty"));
        }

        let mut alternatives = Vec::new();
        for alternative in source.split('|') {
            if alternative.is_empty() {
                return Err(CommandError::invalid_pattern(source, "empty alternative"));
            }
            if alternative.chars().any(char::is_whitespace) {
                return Err(CommandError::invalid_pattern(
                    source,
                    format!("alternative '{alternative}' contains whitespace"),
                ));
            }
            alternatives.push(alternative.to_lowercase());
        }

        let body = alternatives
            .iter()
            .map(|a| regex::escape(a))
            .collect::<Vec<_>>()
            .join("|");
        let regex = RegexBuilder::new(&format!("^(?:{body})$"))
            .case_insensitive(true)
            .build()
            .map_err(|err| CommandError::invalid_pattern(source, err.to_string()))?;

        Ok(Self {
            source: source.to_string(),
            alternatives,
            regex,
        })
    }

    /// Returns whether `token` fully matches one of the alternatives,
    /// ignoring case.
    pub fn matches(&self, token: &str) -> bool {
        self.regex.is_match(&token.to_lowercase())
    }

    /// Returns the pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns the lower-cased alternatives in declaration order.
    pub fn alternatives(&self) -> &[String] {
        &self.alternatives
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// A sub-command: a pattern, an executor, and an optional permission gate
/// checked once the sub-command has been resolved.
#[derive(Clone)]
pub struct SubCommand {
    pattern: Pattern,
    executor: Arc<dyn CommandExecutor>,
    permission: Option<String>,
    permission_message: Option<String>,
}

impl SubCommand {
    /// Creates a sub-command.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InvalidPattern`] if `pattern` does not compile.
    pub fn new(pattern: &str, executor: impl CommandExecutor + 'static) -> CommandResult<Self> {
        Ok(Self {
            pattern: Pattern::compile(pattern)?,
            executor: Arc::new(executor),
            permission: None,
            permission_message: None,
        })
    }

    /// Requires `permission` to run this sub-command. An empty string means
    /// no permission.
    pub fn permission(mut self, permission: impl Into<String>) -> Self {
        let permission = permission.into();
        self.permission = (!permission.is_empty()).then_some(permission);
        self
    }

    /// Sets the message sent when the sub-command permission is missing.
    pub fn permission_message(mut self, message: impl Into<String>) -> Self {
        self.permission_message = Some(message.into());
        self
    }

    /// Returns the compiled pattern.
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Returns the executor.
    pub fn executor(&self) -> &dyn CommandExecutor {
        self.executor.as_ref()
    }

    /// Returns the required permission, if any.
    pub fn get_permission(&self) -> Option<&str> {
        self.permission.as_deref()
    }

    /// Returns the permission denial message, if any.
    pub fn get_permission_message(&self) -> Option<&str> {
        self.permission_message.as_deref()
    }
}

impl fmt::Debug for SubCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubCommand")
            .field("pattern", &self.pattern.as_str())
            .field("permission", &self.permission)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;

    #[test]
    fn test_full_match_only() {
        let pattern = Pattern::compile("sub|test").unwrap();

        assert!(pattern.matches("test"));
        assert!(pattern.matches("TEST"));
        assert!(pattern.matches("Sub"));
        assert!(!pattern.matches("testing"));
        assert!(!pattern.matches("atest"));
        assert!(!pattern.matches(""));
    }

    #[test]
    fn test_literal_alternatives() {
        let pattern = Pattern::compile("a.b|c+").unwrap();

        assert!(pattern.matches("a.b"));
        assert!(!pattern.matches("axb"));
        assert!(pattern.matches("c+"));
        assert!(!pattern.matches("cc"));
        assert_eq!(pattern.alternatives(), ["a.b", "c+"]);
    }

    #[test]
    fn test_invalid_patterns() {
        for source in ["", "  ", "a||b", "|a", "a|", "two words"] {
            assert!(
                matches!(
                    Pattern::compile(source),
                    Err(CommandError::InvalidPattern { .. })
                ),
                "{source:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_sub_command_permission() {
        let sub = SubCommand::new("Give|G", |_: &Context| {})
            .unwrap()
            .permission("example.give")
            .permission_message("no");
        assert_eq!(sub.get_permission(), Some("example.give"));
        assert_eq!(sub.get_permission_message(), Some("no"));
        assert_eq!(sub.pattern().to_string(), "Give|G");
        assert!(sub.pattern().matches("give"));

        let open = SubCommand::new("x", |_: &Context| {}).unwrap().permission("");
        assert_eq!(open.get_permission(), None);
    }
}
