//! Registry rules.
//!
//! A rule answers one question: does this subject fit as its ingredient?

use crate::domain::subject::Subject;
use std::fmt;
use std::sync::Arc;

/// A single entry of a rule registry.
pub trait Rule: Send + Sync + fmt::Debug {
    /// Whether `subject` is accepted as this rule's ingredient.
    fn matches(&self, subject: &dyn Subject) -> bool;
}

/// Matches subjects by code.
///
/// A pattern ending in `*` matches every code starting with the part before
/// it (`game:grain-*`); anything else must match exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientRule {
    pattern: String,
    result: Option<String>,
}

impl IngredientRule {
    /// Create a rule for an ingredient pattern.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            result: None,
        }
    }

    /// Record the code the rule produces.
    pub fn producing(mut self, result: impl Into<String>) -> Self {
        self.result = Some(result.into());
        self
    }

    /// The ingredient pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The produced code, if recorded.
    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    fn matches_code(&self, code: &str) -> bool {
        match self.pattern.strip_suffix('*') {
            Some(prefix) => code.starts_with(prefix),
            None => code == self.pattern,
        }
    }
}

impl Rule for IngredientRule {
    fn matches(&self, subject: &dyn Subject) -> bool {
        self.matches_code(subject.code())
    }
}

/// Function type for closure-backed rules.
pub type MatchFn = Arc<dyn Fn(&dyn Subject) -> bool + Send + Sync>;

/// Rule backed by a closure.
#[derive(Clone)]
pub struct FnRule {
    name: String,
    matcher: MatchFn,
}

impl FnRule {
    /// Create a named closure rule.
    pub fn new<F>(name: impl Into<String>, matcher: F) -> Self
    where
        F: Fn(&dyn Subject) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            matcher: Arc::new(matcher),
        }
    }
}

impl fmt::Debug for FnRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnRule")
            .field("name", &self.name)
            .field("matcher", &"<fn>")
            .finish()
    }
}

impl Rule for FnRule {
    fn matches(&self, subject: &dyn Subject) -> bool {
        (self.matcher)(subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::subject::ItemStack;

    #[test]
    fn test_exact_pattern() {
        let rule = IngredientRule::new("game:grain-spelt").producing("game:flour-spelt");

        assert!(rule.matches(&ItemStack::new("game:grain-spelt")));
        assert!(!rule.matches(&ItemStack::new("game:grain-spelt-x")));
        assert!(!rule.matches(&ItemStack::new("game:flint")));
        assert_eq!(rule.result(), Some("game:flour-spelt"));
    }

    #[test]
    fn test_wildcard_pattern() {
        let rule = IngredientRule::new("game:grain-*");

        assert!(rule.matches(&ItemStack::new("game:grain-rye")));
        assert!(rule.matches(&ItemStack::new("game:grain-")));
        assert!(!rule.matches(&ItemStack::new("game:flint")));
    }

    #[test]
    fn test_lone_star_matches_everything() {
        let rule = IngredientRule::new("*");
        assert!(rule.matches(&ItemStack::new("")));
        assert!(rule.matches(&ItemStack::new("game:anything")));
    }

    #[test]
    fn test_fn_rule() {
        let rule = FnRule::new("ores", |s| s.code().starts_with("game:ore-"));

        assert!(rule.matches(&ItemStack::new("game:ore-poor-cassiterite")));
        assert!(!rule.matches(&ItemStack::new("game:bone")));
        assert!(format!("{:?}", rule).contains("ores"));
    }
}
