use crate::libmunje::geomsaek::Criteria;
use std::collections::HashSet;

/// All mutable state the interactive view owns: the current criteria and the
/// set of expanded question ids. Everything else is derived from the bank on
/// demand, so resetting or replaying state is just replacing this value.
#[derive(Debug, Default)]
pub struct ViewState {
    pub criteria: Criteria,
    expanded: HashSet<i64>,
}

impl ViewState {
    pub fn new(criteria: Criteria) -> ViewState {
        ViewState {
            criteria,
            expanded: HashSet::new(),
        }
    }

    /// Inserts the id if absent, removes it if present. Returns whether the
    /// question is expanded afterwards. The set is independent of the current
    /// filter result: ids stay toggled while filtered out of view.
    pub fn toggle_expanded(&mut self, id: i64) -> bool {
        if !self.expanded.insert(id) {
            self.expanded.remove(&id);
            false
        } else {
            true
        }
    }

    pub fn is_expanded(&self, id: i64) -> bool {
        self.expanded.contains(&id)
    }

    pub fn expanded_count(&self) -> usize {
        self.expanded.len()
    }

    /// Restores every criterion to its default. Expanded ids are untouched.
    pub fn reset(&mut self) {
        self.criteria = Criteria::default();
    }
}
