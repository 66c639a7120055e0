//! Ordered font-name set used for allow-lists and fallback candidates.

/// Insertion-ordered set of font family names.
///
/// Used both as the deployment's allow-list and as the per-chain fallback
/// candidate set. Iteration order is insertion order, which makes the
/// "first remaining candidate" choice in the fallback heuristic stable.
/// Sets are small (tens of fonts), so membership is a linear scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontSet {
    names: Vec<String>,
}

impl FontSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a name; returns `false` if it was already present.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.names.push(name);
        true
    }

    /// Remove a name; returns `true` if it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.names.iter().position(|n| n == name) {
            Some(idx) => {
                self.names.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// First remaining name in insertion order.
    pub fn first(&self) -> Option<&str> {
        self.names.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for FontSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = FontSet::new();
        for name in iter {
            set.insert(name);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_is_kept() {
        let set: FontSet = ["B", "A", "C"].into_iter().collect();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["B", "A", "C"]);
        assert_eq!(set.first(), Some("B"));
    }

    #[test]
    fn test_duplicates_are_ignored() {
        let mut set = FontSet::new();
        assert!(set.insert("Arial Regular"));
        assert!(!set.insert("Arial Regular"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut set: FontSet = ["A", "B"].into_iter().collect();
        assert!(set.remove("A"));
        assert!(!set.remove("A"));
        assert_eq!(set.first(), Some("B"));
        assert!(set.remove("B"));
        assert!(set.is_empty());
        assert_eq!(set.first(), None);
    }
}
