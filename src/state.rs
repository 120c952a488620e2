use crate::openai::GenerationError;

/// Outcome of the most recent attempt. A new outcome always replaces the old one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GenerationResult {
    #[default]
    Empty,
    Success(String),
    Failure(String),
}

/// Everything the window shows, kept free of any widget types so the
/// transitions can be exercised directly.
#[derive(Debug, Clone, Default)]
pub struct GeneratorState {
    idea: String,
    result: GenerationResult,
    loading: bool,
}

impl GeneratorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn idea(&self) -> &str {
        &self.idea
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_idea(&mut self, idea: String) {
        self.idea = idea;
    }

    /// Starts an attempt and hands back the idea to send. Returns `None` while
    /// a request is already outstanding.
    pub fn begin(&mut self) -> Option<String> {
        if self.loading {
            return None;
        }
        self.loading = true;
        if matches!(self.result, GenerationResult::Failure(_)) {
            self.result = GenerationResult::Empty;
        }
        Some(self.idea.clone())
    }

    /// Records the outcome of the outstanding attempt.
    pub fn settle(&mut self, outcome: Result<String, GenerationError>) {
        self.loading = false;
        self.result = match outcome {
            Ok(text) => GenerationResult::Success(text.trim().to_string()),
            Err(e) => GenerationResult::Failure(e.user_message()),
        };
    }

    pub fn generated(&self) -> Option<&str> {
        match &self.result {
            GenerationResult::Success(html) if !html.is_empty() => Some(html),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.result {
            GenerationResult::Failure(message) => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai::GENERIC_FAILURE;

    #[test]
    fn test_begin_sets_loading_and_returns_idea() {
        let mut state = GeneratorState::new();
        state.set_idea("dog walking service".to_string());

        assert_eq!(state.begin().as_deref(), Some("dog walking service"));
        assert!(state.is_loading());
        // The idea survives a submission.
        assert_eq!(state.idea(), "dog walking service");
    }

    #[test]
    fn test_second_begin_while_loading_is_refused() {
        let mut state = GeneratorState::new();
        assert!(state.begin().is_some());
        assert_eq!(state.begin(), None);
        assert!(state.is_loading());
    }

    #[test]
    fn test_empty_idea_is_dispatched() {
        let mut state = GeneratorState::new();
        assert_eq!(state.begin().as_deref(), Some(""));
    }

    #[test]
    fn test_settle_clears_loading_for_every_outcome() {
        let outcomes = [
            Ok("<html></html>".to_string()),
            Err(GenerationError::Api("rate limited".to_string())),
            Err(GenerationError::Transport("connection reset".to_string())),
            Err(GenerationError::Malformed("no choices".to_string())),
        ];
        for outcome in outcomes {
            let mut state = GeneratorState::new();
            state.begin();
            state.settle(outcome);
            assert!(!state.is_loading());
            assert!(state.begin().is_some(), "ready for another attempt");
        }
    }

    #[test]
    fn test_success_is_trimmed() {
        let mut state = GeneratorState::new();
        state.begin();
        state.settle(Ok("  <html>...</html>\n".to_string()));
        assert_eq!(state.generated(), Some("<html>...</html>"));
        assert_eq!(state.error(), None);
    }

    #[test]
    fn test_api_error_replaces_stale_content() {
        let mut state = GeneratorState::new();
        state.begin();
        state.settle(Ok("<html>old</html>".to_string()));

        state.begin();
        // Previous page stays visible while the next one is in flight.
        assert_eq!(state.generated(), Some("<html>old</html>"));
        state.settle(Err(GenerationError::Api("rate limited".to_string())));

        assert_eq!(state.error(), Some("rate limited"));
        assert_eq!(state.generated(), None);
    }

    #[test]
    fn test_transport_error_shows_generic_message() {
        let mut state = GeneratorState::new();
        state.begin();
        state.settle(Err(GenerationError::Transport("dns failure".to_string())));
        assert_eq!(state.error(), Some(GENERIC_FAILURE));
    }

    #[test]
    fn test_begin_clears_previous_error() {
        let mut state = GeneratorState::new();
        state.begin();
        state.settle(Err(GenerationError::Api("bad key".to_string())));

        state.begin();
        assert_eq!(state.error(), None);
        assert_eq!(state.result, GenerationResult::Empty);
    }
}
