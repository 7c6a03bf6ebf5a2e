//! Ordered client-id sets.

use indexmap::IndexSet;

use crate::protocol::{ALL_CLIENT_IDS, NO_CLIENT_IDS};

/// Ordered set of client ids eligible for processing.
///
/// An empty set means "skip"; a set containing [`ALL_CLIENT_IDS`] means the
/// whole tree, bypassing id matching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeIdSet(IndexSet<String>);

impl NodeIdSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a list of ids separated by runs of spaces or tabs.
    ///
    /// `@none` tokens carry no ids and are dropped.
    pub fn parse(value: &str) -> Self {
        value
            .split([' ', '\t'])
            .filter(|token| !token.is_empty() && *token != NO_CLIENT_IDS)
            .collect()
    }

    /// Insert `id` at the front, moving it there if already present.
    pub fn prepend(&mut self, id: impl Into<String>) {
        let id = id.into();
        let rest = std::mem::take(&mut self.0);
        self.0.insert(id.clone());
        self.0.extend(rest.into_iter().filter(|existing| *existing != id));
    }

    /// Append `id` unless already present.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.0.insert(id.into())
    }

    /// Whether the set holds the `@all` sentinel.
    pub fn is_all(&self) -> bool {
        self.0.contains(ALL_CLIENT_IDS)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// First id in the set.
    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Ids as an owned vector, in order.
    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for NodeIdSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl IntoIterator for NodeIdSet {
    type Item = String;
    type IntoIter = indexmap::set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whitespace_runs() {
        let ids = NodeIdSet::parse("  form:a \t\tform:b   form:c ");
        assert_eq!(ids.to_vec(), vec!["form:a", "form:b", "form:c"]);
    }

    #[test]
    fn test_parse_empty_and_none() {
        assert!(NodeIdSet::parse("").is_empty());
        assert!(NodeIdSet::parse(" \t ").is_empty());
        assert!(NodeIdSet::parse("@none").is_empty());
    }

    #[test]
    fn test_duplicates_collapse() {
        let ids = NodeIdSet::parse("a b a");
        assert_eq!(ids.to_vec(), vec!["a", "b"]);
    }

    #[test]
    fn test_prepend_moves_existing() {
        let mut ids = NodeIdSet::parse("a b c");
        ids.prepend("c");
        assert_eq!(ids.to_vec(), vec!["c", "a", "b"]);
        ids.prepend("z");
        assert_eq!(ids.first(), Some("z"));
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn test_all_sentinel() {
        assert!(NodeIdSet::parse("@all").is_all());
        assert!(!NodeIdSet::parse("all").is_all());
    }
}
