/// The dropdown presenting suggestions for a searchable field.
pub trait SuggestionView {
    /// The suggestion list changed; re-render from `labels`.
    fn value_changed(&mut self, labels: &[String]);
}

impl<F> SuggestionView for F
where
    F: FnMut(&[String]),
{
    fn value_changed(&mut self, labels: &[String]) {
        self(labels)
    }
}

/// Keeps every rendered list; the last one is what the user sees.
#[derive(Debug, Clone, Default)]
pub struct RecordingView {
    pub renders: Vec<Vec<String>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visible(&self) -> &[String] {
        self.renders.last().map(Vec::as_slice).unwrap_or(&[])
    }
}

impl SuggestionView for RecordingView {
    fn value_changed(&mut self, labels: &[String]) {
        self.renders.push(labels.to_vec());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_as_view() {
        let mut seen = 0;
        {
            let mut view = |labels: &[String]| seen += labels.len();
            view.value_changed(&["a".to_string(), "b".to_string()]);
        }
        assert_eq!(seen, 2);
    }

    #[test]
    fn test_recording_view_shows_last_render() {
        let mut view = RecordingView::new();
        assert!(view.visible().is_empty());
        view.value_changed(&["Foo".to_string()]);
        view.value_changed(&[]);
        assert!(view.visible().is_empty());
        assert_eq!(view.renders.len(), 2);
    }
}
