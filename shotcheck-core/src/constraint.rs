//! Constraint extraction from model feedback
//!
//! Constraints are physical facts about the shooting space ("cannot move
//! back further") learned from feedback text. The matching policy is a
//! declarative rule table so it stays data rather than scattered
//! conditionals, and can be tested apart from the orchestration flow.

use serde::{Deserialize, Serialize};

/// Pattern -> tag rules. Patterns match case-insensitively as
/// substrings; each rule fires independently, so one text can yield
/// several constraints.
const RULES: &[(&[&str], &str)] = &[
    (
        &["can't move back", "cannot move back"],
        "cannot move back further",
    ),
    (
        &["wall behind", "against wall"],
        "wall directly behind camera position",
    ),
];

/// Extract every constraint tag whose patterns appear in the feedback
///
/// Unmatched text yields an empty vec, not an error.
pub fn extract(feedback: &str) -> Vec<&'static str> {
    let lowered = feedback.to_lowercase();
    RULES
        .iter()
        .filter(|(patterns, _)| patterns.iter().any(|p| lowered.contains(p)))
        .map(|(_, tag)| *tag)
        .collect()
}

/// Insertion-order-preserving set of constraint tags
///
/// A session's constraints grow monotonically and survive angle resets;
/// responses list them in first-learned order so output is
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConstraintSet {
    tags: Vec<String>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tag, returning true when it was not already present
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.tags.iter().any(|t| *t == tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    /// Run extraction over feedback and fold the results in
    ///
    /// Returns how many tags were newly learned.
    pub fn extend_from_feedback(&mut self, feedback: &str) -> usize {
        extract(feedback)
            .into_iter()
            .filter(|tag| self.insert(*tag))
            .count()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.tags
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.tags.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Extraction Tests ====================

    #[test]
    fn extracts_cannot_move_back_from_contraction() {
        let tags = extract("I can't move back any further in this room");
        assert_eq!(tags, vec!["cannot move back further"]);
    }

    #[test]
    fn extracts_cannot_move_back_from_full_form() {
        let tags = extract("You cannot move back from here");
        assert_eq!(tags, vec!["cannot move back further"]);
    }

    #[test]
    fn extracts_wall_constraint() {
        let tags = extract("There is a wall behind you");
        assert_eq!(tags, vec!["wall directly behind camera position"]);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let tags = extract("CANNOT MOVE BACK; you are AGAINST WALL");
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn multiple_rules_fire_from_one_text() {
        let tags = extract("can't move back, you're up against wall already");
        assert!(tags.contains(&"cannot move back further"));
        assert!(tags.contains(&"wall directly behind camera position"));
    }

    #[test]
    fn unmatched_text_yields_empty_set() {
        assert!(extract("Lovely framing, nothing to change").is_empty());
        assert!(extract("").is_empty());
    }

    // ==================== ConstraintSet Tests ====================

    #[test]
    fn insert_preserves_insertion_order() {
        let mut set = ConstraintSet::new();
        set.insert("b");
        set.insert("a");
        set.insert("c");
        assert_eq!(set.as_slice(), &["b", "a", "c"]);
    }

    #[test]
    fn insert_rejects_duplicates() {
        let mut set = ConstraintSet::new();
        assert!(set.insert("cannot move back further"));
        assert!(!set.insert("cannot move back further"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn extend_from_feedback_counts_only_new_tags() {
        let mut set = ConstraintSet::new();
        assert_eq!(set.extend_from_feedback("can't move back"), 1);
        assert_eq!(set.extend_from_feedback("cannot move back, wall behind"), 1);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn serializes_as_plain_list() {
        let mut set = ConstraintSet::new();
        set.insert("cannot move back further");
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["cannot move back further"]"#);

        let parsed: ConstraintSet = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, set);
    }
}
