//! Per-class and per-dimension-area visibility toggles.

use std::collections::{BTreeSet, HashMap};

/// What the user has hidden. Everything is visible by default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisibilityState {
    hidden_dimensions: BTreeSet<i64>,
    class_visibility: HashMap<String, bool>,
}

impl VisibilityState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_class_visible(&self, class: &str) -> bool {
        self.class_visibility.get(class).copied().unwrap_or(true)
    }

    pub fn set_class_visible(&mut self, class: &str, visible: bool) {
        self.class_visibility.insert(class.to_string(), visible);
    }

    /// Flip a class toggle and return its new visibility.
    pub fn toggle_class(&mut self, class: &str) -> bool {
        let visible = !self.is_class_visible(class);
        self.set_class_visible(class, visible);
        visible
    }

    pub fn is_dimension_hidden(&self, idx: i64) -> bool {
        self.hidden_dimensions.contains(&idx)
    }

    pub fn set_dimension_hidden(&mut self, idx: i64, hidden: bool) {
        if hidden {
            self.hidden_dimensions.insert(idx);
        } else {
            self.hidden_dimensions.remove(&idx);
        }
    }

    /// Flip a dimension area toggle and return whether it is now hidden.
    pub fn toggle_dimension(&mut self, idx: i64) -> bool {
        let hidden = !self.is_dimension_hidden(idx);
        self.set_dimension_hidden(idx, hidden);
        hidden
    }

    pub fn hidden_dimensions(&self) -> &BTreeSet<i64> {
        &self.hidden_dimensions
    }
}
