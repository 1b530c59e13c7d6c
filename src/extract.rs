use crate::types::CodeBlock;
use once_cell::sync::Lazy;
use regex::Regex;

/// First fenced block: optional language tag, then everything up to the next
/// closing fence (non-greedy, across lines).
static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(\w*)\s*(.*?)```").expect("code fence pattern"));

const DEFAULT_LANGUAGE: &str = "text";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeExtraction {
    pub language: String,
    pub content: String,
    /// The input with the matched fence removed, trimmed.
    pub cleaned_text: String,
}

impl CodeExtraction {
    pub fn code_block(&self) -> CodeBlock {
        CodeBlock {
            language: self.language.clone(),
            content: self.content.clone(),
        }
    }
}

/// Pull the first fenced code block out of a model reply.
///
/// Only the first block is considered; any later fences stay in
/// `cleaned_text` verbatim.
pub fn extract_code_block(text: &str) -> Option<CodeExtraction> {
    let captures = CODE_FENCE.captures(text)?;
    let whole = captures.get(0)?;

    let language = match captures.get(1).map(|m| m.as_str()) {
        Some(tag) if !tag.is_empty() => tag.to_string(),
        _ => DEFAULT_LANGUAGE.to_string(),
    };
    let content = captures
        .get(2)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    let mut cleaned = String::with_capacity(text.len() - whole.len());
    cleaned.push_str(&text[..whole.start()]);
    cleaned.push_str(&text[whole.end()..]);

    Some(CodeExtraction {
        language,
        content,
        cleaned_text: cleaned.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_inline_block() {
        let out = extract_code_block("pre ```js\nconsole.log(1)\n``` post").unwrap();
        assert_eq!(out.language, "js");
        assert_eq!(out.content, "console.log(1)");
        assert_eq!(out.cleaned_text, "pre  post");
    }

    #[test]
    fn no_fence_yields_none() {
        assert!(extract_code_block("just some prose, no code").is_none());
        assert!(extract_code_block("a single ``` fence").is_none());
    }

    #[test]
    fn untagged_fence_defaults_to_text() {
        let out = extract_code_block("```\nplain\n```").unwrap();
        assert_eq!(out.language, "text");
        assert_eq!(out.content, "plain");
        assert_eq!(out.cleaned_text, "");
    }

    #[test]
    fn only_first_block_is_taken() {
        let text = "intro\n```html\n<p>a</p>\n```\nmiddle\n```css\np {}\n```";
        let out = extract_code_block(text).unwrap();
        assert_eq!(out.language, "html");
        assert_eq!(out.content, "<p>a</p>");
        assert_eq!(out.cleaned_text, "intro\n\nmiddle\n```css\np {}\n```");
    }

    #[test]
    fn multiline_content_is_trimmed() {
        let text = "```python\n\n  def f():\n      return 1\n\n```";
        let out = extract_code_block(text).unwrap();
        assert_eq!(out.language, "python");
        assert_eq!(out.content, "def f():\n      return 1");
    }
}
