use crate::types::InteractionMode;

const WEBSITE_PROMPT: &str = r#"You are an expert web developer. Build a complete, working website from the description below.
Return a single HTML file that contains all of the CSS and JavaScript it needs, inside one ```html code block.
Do not add any explanation outside the code block."#;

const DOCUMENT_PROMPT: &str = r#"You are a writing assistant. Write a detailed, well-structured document from the description below.
Reply with the document content only, using Markdown for formatting (headings, lists, bold, etc.)."#;

/// The text actually sent to the backend for a user turn. The chat keeps
/// showing the raw text.
pub fn effective_prompt(mode: InteractionMode, text: &str) -> String {
    match mode {
        InteractionMode::Website => wrap(WEBSITE_PROMPT, text),
        InteractionMode::Document => wrap(DOCUMENT_PROMPT, text),
        InteractionMode::Chat | InteractionMode::Image => text.to_string(),
    }
}

fn wrap(instructions: &str, text: &str) -> String {
    format!("{instructions}\n\nDescription: \"{text}\"")
}
