/// A single suggestion: the label shown to the user and, for label/value
/// fields, the machine value submitted in its place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub label: String,
    pub value: Option<String>,
}

impl Suggestion {
    pub fn label(label: &str) -> Self {
        Self {
            label: label.to_string(),
            value: None,
        }
    }

    pub fn pair(label: &str, value: &str) -> Self {
        Self {
            label: label.to_string(),
            value: Some(value.to_string()),
        }
    }
}

/// Suggestions of the most recently applied query for one field.
///
/// The store is only ever replaced wholesale or emptied.
#[derive(Debug, Clone, Default)]
pub struct SuggestionStore {
    entries: Vec<Suggestion>,
}

impl SuggestionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, entries: Vec<Suggestion>) {
        self.entries = entries;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[Suggestion] {
        &self.entries
    }

    /// Labels in the order the server returned them.
    pub fn current_labels(&self) -> Vec<String> {
        self.entries.iter().map(|s| s.label.clone()).collect()
    }

    /// Machine value recorded for an exact label.
    pub fn resolve(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|s| s.label == label)
            .and_then(|s| s.value.as_deref())
    }
}
