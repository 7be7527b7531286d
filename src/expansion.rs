use std::collections::BTreeSet;

/// Per-parent expand/collapse state, keyed by vehicle id. Everything starts
/// collapsed and the state outlives individual render passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    expanded: BTreeSet<String>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    /// Flips one parent; returns the new state.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.expanded.remove(id) {
            false
        } else {
            self.expanded.insert(id.to_string());
            true
        }
    }

    pub fn expanded_ids(&self) -> impl Iterator<Item = &str> {
        self.expanded.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ExpansionState {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            expanded: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_only_that_parent() {
        let mut state = ExpansionState::new();
        assert!(state.toggle("a"));
        assert!(state.is_expanded("a"));
        assert!(!state.is_expanded("b"));
        assert!(!state.toggle("a"));
        assert_eq!(state, ExpansionState::new());
    }

    #[test]
    fn collects_from_ids() {
        let state: ExpansionState = ["a", "b"].into_iter().collect();
        assert_eq!(state.expanded_ids().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
