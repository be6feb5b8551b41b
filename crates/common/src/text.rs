//! Conversation title helpers shared by the backend and the client

/// Title given to conversations that have nothing better to go by
pub const DEFAULT_TITLE: &str = "New Conversation";

/// Number of characters kept when a title is derived from a message
pub const DERIVED_TITLE_CHARS: usize = 30;

/// Marker appended to truncated titles
pub const ELLIPSIS: &str = "...";

/// Derive a conversation title from the first message of a conversation.
///
/// Counts characters, not bytes, so multi-byte text is never split.
pub fn derive_title(message: &str) -> String {
    let message = message.trim();
    if message.is_empty() {
        return DEFAULT_TITLE.to_string();
    }

    match message.char_indices().nth(DERIVED_TITLE_CHARS) {
        Some((cut, _)) => format!("{}{}", &message[..cut], ELLIPSIS),
        None => message.to_string(),
    }
}

/// Returns the trimmed value when it carries any non-whitespace text
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
