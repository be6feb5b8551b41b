//! Assistant domain state

use palaver_llm::LlmService;
use std::sync::Arc;

/// Application state for the Assistant domain
#[derive(Clone)]
pub struct AssistantState {
    pub llm: Arc<dyn LlmService>,
}
