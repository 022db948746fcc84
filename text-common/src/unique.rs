use std::collections::HashSet;

/// Insertion ordered set of strings.
#[derive(Debug, Clone, Default)]
pub struct UniqueStrings {
    known: HashSet<String>,
    items: Vec<String>,
}

impl UniqueStrings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(size: usize) -> Self {
        Self {
            known: HashSet::with_capacity(size),
            items: Vec::with_capacity(size),
        }
    }

    pub fn contains(&self, item: &str) -> bool {
        self.known.contains(item)
    }

    /// Add `item` unless it is already present.
    pub fn append(&mut self, item: &str) -> &mut Self {
        if self.known.insert(item.to_string()) {
            self.items.push(item.to_string());
        }
        self
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn into_items(self) -> Vec<String> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for UniqueStrings {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = Self::new();
        for item in iter {
            set.append(item);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_keeps_first_occurrence() {
        let mut set = UniqueStrings::new();
        set.append("b").append("a").append("b");

        assert_eq!(set.items(), ["b", "a"]);
        assert_eq!(set.len(), 2);
        assert!(set.contains("a"));
        assert!(!set.contains("c"));
    }

    #[test]
    fn test_collect() {
        let set: UniqueStrings = "x y x z y".split(' ').collect();

        assert_eq!(set.into_items(), vec!["x", "y", "z"]);
        assert!(UniqueStrings::new().is_empty());
    }
}
