//! Identifier sets, diffs, and the per-run values passed between collaborators.

use std::collections::BTreeSet;
use std::collections::btree_set;
use std::fmt;

use serde::Serialize;

/// Content hash naming one torrent (Transmission's `hashString`).
///
/// Equality is exact string match on the trimmed value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// Parse one feed entry, trimming surrounding whitespace.
    ///
    /// Returns `None` for empty or blank input so callers can't build an empty identifier.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unordered set of identifiers.
///
/// Backed by a `BTreeSet` so serialized output is stable; nothing relies on the order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IdentifierSet(BTreeSet<Identifier>);

impl IdentifierSet {
    /// Create an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Parse a newline-delimited identifier list. Blank lines are dropped and duplicates collapse.
    #[must_use]
    pub fn from_lines(text: &str) -> Self {
        text.lines().filter_map(Identifier::parse).collect()
    }

    /// Insert an identifier, returning `true` when it was not already present.
    pub fn insert(&mut self, id: Identifier) -> bool {
        self.0.insert(id)
    }

    /// Whether the set contains `id`.
    #[must_use]
    pub fn contains(&self, id: &Identifier) -> bool {
        self.0.contains(id)
    }

    /// Number of identifiers in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the identifiers.
    pub fn iter(&self) -> btree_set::Iter<'_, Identifier> {
        self.0.iter()
    }

    /// Identifiers in `self` that are not in `other`.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        self.0.difference(&other.0).cloned().collect()
    }

    /// Identifiers present in both sets.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        self.0.intersection(&other.0).cloned().collect()
    }

    /// Whether the two sets share no identifier.
    #[must_use]
    pub fn is_disjoint(&self, other: &Self) -> bool {
        self.0.is_disjoint(&other.0)
    }
}

impl FromIterator<Identifier> for IdentifierSet {
    fn from_iter<T: IntoIterator<Item = Identifier>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Identifier> for IdentifierSet {
    fn extend<T: IntoIterator<Item = Identifier>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl IntoIterator for IdentifierSet {
    type Item = Identifier;
    type IntoIter = btree_set::IntoIter<Identifier>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a IdentifierSet {
    type Item = &'a Identifier;
    type IntoIter = btree_set::Iter<'a, Identifier>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Additions and removals that move the current set to the desired set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diff {
    /// Desired but not loaded.
    pub to_add: IdentifierSet,
    /// Loaded but no longer desired.
    pub to_remove: IdentifierSet,
}

impl Diff {
    /// Compute `desired - current` and `current - desired`.
    #[must_use]
    pub fn between(desired: &IdentifierSet, current: &IdentifierSet) -> Self {
        Self {
            to_add: desired.difference(current),
            to_remove: current.difference(desired),
        }
    }

    /// Whether the diff requires no mutation at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Session credential handed out by the daemon for the duration of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a raw token value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the raw token value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Raw metainfo bytes for one identifier.
#[derive(Clone, PartialEq, Eq)]
pub struct Payload(Vec<u8>);

impl Payload {
    /// Wrap fetched bytes.
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Borrow the raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Payload size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the payload carries no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payload")
            .field("len", &self.0.len())
            .finish()
    }
}

/// How the daemon acknowledged an addition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddResult {
    /// The torrent was newly admitted.
    Added,
    /// The daemon already had the torrent loaded.
    Duplicate,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> IdentifierSet {
        items
            .iter()
            .copied()
            .filter_map(Identifier::parse)
            .collect()
    }

    #[test]
    fn from_lines_drops_blank_entries() {
        let parsed = IdentifierSet::from_lines("a\nb\n\n\nc\n");
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed, set(&["a", "b", "c"]));
        assert!(parsed.iter().all(|id| !id.as_str().is_empty()));
    }

    #[test]
    fn from_lines_handles_crlf_and_whitespace_only_lines() {
        let parsed = IdentifierSet::from_lines("abc\r\n   \r\ndef\r\n\t\n");
        assert_eq!(parsed, set(&["abc", "def"]));
    }

    #[test]
    fn from_lines_collapses_duplicates() {
        let parsed = IdentifierSet::from_lines("a\na\nb\na\n");
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn identifier_parse_rejects_blank() {
        assert!(Identifier::parse("").is_none());
        assert!(Identifier::parse("  \t").is_none());
        assert_eq!(
            Identifier::parse(" deadbeef ").map(|id| id.to_string()),
            Some("deadbeef".to_string())
        );
    }

    #[test]
    fn identifier_equality_is_exact() {
        assert_ne!(Identifier::parse("ABC"), Identifier::parse("abc"));
    }

    #[test]
    fn diff_partitions_both_sets() {
        let desired = set(&["a", "b", "c", "d"]);
        let current = set(&["c", "d", "e"]);
        let diff = Diff::between(&desired, &current);
        let common = desired.intersection(&current);

        assert_eq!(diff.to_add, set(&["a", "b"]));
        assert_eq!(diff.to_remove, set(&["e"]));
        assert!(diff.to_add.is_disjoint(&diff.to_remove));
        assert!(diff.to_add.is_disjoint(&common));
        assert!(diff.to_remove.is_disjoint(&common));

        let mut rebuilt_desired = common.clone();
        rebuilt_desired.extend(diff.to_add.iter().cloned());
        assert_eq!(rebuilt_desired, desired);

        let mut rebuilt_current = common;
        rebuilt_current.extend(diff.to_remove.iter().cloned());
        assert_eq!(rebuilt_current, current);
    }

    #[test]
    fn diff_of_identical_sets_is_empty() {
        let items = set(&["a", "b"]);
        assert!(Diff::between(&items, &items).is_empty());
    }

    #[test]
    fn diff_serializes_as_flat_lists() {
        let diff = Diff::between(&set(&["new"]), &set(&["old"]));
        let value = serde_json::to_value(&diff).expect("serialize diff");
        assert_eq!(
            value,
            serde_json::json!({"to_add": ["new"], "to_remove": ["old"]})
        );
    }

    #[test]
    fn payload_debug_hides_bytes() {
        let payload = Payload::new(b"d8:announce".to_vec());
        assert_eq!(format!("{payload:?}"), "Payload { len: 11 }");
    }
}
