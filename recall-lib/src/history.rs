//! Bounded, most-recent-first history list for a single field.

/// Default number of entries kept per field.
pub const DEFAULT_MAX_HISTORY_ITEMS: usize = 50;

/// Ordered history of one field.
///
/// Entries are unique (case-sensitive), most recent first, and never more
/// than `max_items` long.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldHistory {
    entries: Vec<String>,
    max_items: usize,
}

impl Default for FieldHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY_ITEMS)
    }
}

impl FieldHistory {
    /// Create an empty history holding at most `max_items` entries.
    ///
    /// A bound of zero is treated as one.
    pub fn new(max_items: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_items: max_items.max(1),
        }
    }

    /// Build a history from stored entries.
    ///
    /// Duplicates after the first occurrence are dropped and the list is
    /// truncated to the bound, so a hand-edited or stale record can't break
    /// the invariants.
    pub fn from_entries(entries: Vec<String>, max_items: usize) -> Self {
        let mut history = Self::new(max_items);
        for entry in entries {
            if !history.entries.contains(&entry) {
                history.entries.push(entry);
            }
        }
        history.entries.truncate(history.max_items);
        history
    }

    /// Insert an entry at the front, or move it there if it already exists.
    ///
    /// Leading and trailing whitespace is stripped. Empty entries are
    /// ignored. Returns `true` if the history changed.
    pub fn insert_or_promote(&mut self, entry: &str) -> bool {
        let entry = entry.trim();
        if entry.is_empty() {
            return false;
        }

        match self.entries.iter().position(|e| e == entry) {
            Some(0) => false,
            Some(index) => {
                let existing = self.entries.remove(index);
                self.entries.insert(0, existing);
                true
            }
            None => {
                self.entries.insert(0, entry.to_string());
                self.entries.truncate(self.max_items);
                true
            }
        }
    }

    /// Remove an entry. Returns `true` if it was present.
    pub fn remove(&mut self, entry: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e != entry);
        self.entries.len() != before
    }

    /// Entries, most recent first.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Copy the entries out, e.g. for persisting.
    pub fn to_vec(&self) -> Vec<String> {
        self.entries.clone()
    }

    /// Maximum number of entries kept.
    pub fn max_items(&self) -> usize {
        self.max_items
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the history is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if an entry is present (case-sensitive).
    pub fn contains(&self, entry: &str) -> bool {
        self.entries.iter().any(|e| e == entry)
    }
}
