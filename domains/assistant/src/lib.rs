//! Assistant domain: relays prompts to the generative-language API

pub mod api;

// Re-export API types
pub use api::routes;
pub use api::AssistantState;
