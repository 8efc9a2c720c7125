//! Code block extraction from model responses.

use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};
use regex::Regex;

/// Language of a generated source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    Tsx,
    Jsx,
    TypeScript,
    JavaScript,
    Css,
    Json,
    Html,
    #[default]
    Unknown,
}

impl Language {
    /// Parse language from code fence info string.
    pub fn from_info(info: &str) -> Self {
        let lang = info.split_whitespace().next().unwrap_or("");
        match lang.to_lowercase().as_str() {
            "tsx" => Self::Tsx,
            "jsx" => Self::Jsx,
            "ts" | "typescript" => Self::TypeScript,
            "js" | "javascript" => Self::JavaScript,
            "css" => Self::Css,
            "json" => Self::Json,
            "html" => Self::Html,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tsx => "tsx",
            Self::Jsx => "jsx",
            Self::TypeScript => "ts",
            Self::JavaScript => "js",
            Self::Css => "css",
            Self::Json => "json",
            Self::Html => "html",
            Self::Unknown => "text",
        }
    }
}

static LEADING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```[A-Za-z0-9_+-]*[^\n]*\n?").expect("valid regex"));
static TRAILING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n?```\s*$").expect("valid regex"));

/// Extract generated source code from a model response.
///
/// Prefers the first fenced block tagged with `hint`, then the first fenced
/// block of any language. Without complete fences, stray fence lines at either
/// end are stripped and the rest is returned trimmed. An empty result means
/// the response held no code.
pub fn extract_code(response: &str, hint: Language) -> String {
    let blocks = fenced_blocks(response);

    let chosen = blocks
        .iter()
        .find(|(lang, _)| *lang == hint && hint != Language::Unknown)
        .or_else(|| blocks.first());

    if let Some((_, source)) = chosen {
        return source.trim().to_string();
    }

    let trimmed = response.trim();
    let without_open = LEADING_FENCE.replace(trimmed, "");
    let without_close = TRAILING_FENCE.replace(&without_open, "");
    without_close.trim().to_string()
}

/// All fenced code blocks with their declared language.
fn fenced_blocks(markdown: &str) -> Vec<(Language, String)> {
    let mut blocks = Vec::new();
    let mut current: Option<(Language, String)> = None;

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                current = Some((Language::from_info(&info), String::new()));
            }
            Event::Text(text) => {
                if let Some((_, ref mut source)) = current {
                    source.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some(block) = current.take() {
                    blocks.push(block);
                }
            }
            _ => {}
        }
    }

    blocks
}
