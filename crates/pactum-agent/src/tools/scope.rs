//! Closed tool scopes.
//!
//! Each agent sees exactly one scope: a fieldless enum listing every tool
//! name it may call. Handlers are attached through an exhaustive `match`
//! (see the `handler` functions next to each enum), so a variant without a
//! handler does not compile.

use std::fmt::Debug;

/// A closed set of tool names belonging to one agent.
pub trait ToolScope: Copy + Eq + Debug + Send + Sync + 'static {
    /// Scope label used in logs and `UnknownToolError` messages.
    const SCOPE: &'static str;

    /// Every variant, in the order definitions are sent to the model.
    const ALL: &'static [Self];

    /// Tool name as the model sees it.
    fn name(self) -> &'static str;

    /// Resolve a model-supplied name. `None` if it is not part of this scope.
    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|tool| tool.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Demo {
        Alpha,
        Beta,
    }

    impl ToolScope for Demo {
        const SCOPE: &'static str = "demo";
        const ALL: &'static [Self] = &[Demo::Alpha, Demo::Beta];

        fn name(self) -> &'static str {
            match self {
                Demo::Alpha => "alpha",
                Demo::Beta => "beta",
            }
        }
    }

    #[test]
    fn test_from_name_round_trips_every_variant() {
        for tool in Demo::ALL {
            assert_eq!(Demo::from_name(tool.name()), Some(*tool));
        }
    }

    #[test]
    fn test_from_name_rejects_foreign_names() {
        assert_eq!(Demo::from_name("gamma"), None);
        assert_eq!(Demo::from_name("Alpha"), None);
    }
}
