//! Model output to display HTML
//!
//! `format` runs a fixed pipeline over a token sequence:
//!
//! 1. fenced code blocks (contents escaped on the spot)
//! 2. inline code spans
//! 3. bold
//! 4. italic
//! 5. list items, grouped into `<ul>`/`<ol>` blocks
//! 6. paragraphs, split on blank lines
//!
//! Each stage only looks inside plain `Text` tokens, so nothing a stage has
//! claimed is seen again by a later stage. Every fragment is escaped when
//! rendered and the final HTML goes through an allow-list sanitizer.
//!
//! Formatting is not idempotent: feeding formatted HTML back in escapes it.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static FENCE: LazyLock<Regex> = LazyLock::new(|| compile(r"```(\w*)\r?\n([\s\S]*?)```"));
static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| compile(r"`([^`]+)`"));
static BOLD: LazyLock<Regex> = LazyLock::new(|| compile(r"\*\*([^*\n]+)\*\*"));
// The opening `*` must touch text, which keeps `* item` list markers out.
static ITALIC: LazyLock<Regex> = LazyLock::new(|| compile(r"\*([^\s*][^*\n]*)\*"));
static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| compile(r"^\s*(?:[-*]|(\d+)\.)\s+"));

const ALLOWED_TAGS: &[&str] = &[
    "p", "strong", "em", "code", "pre", "ul", "ol", "li", "div", "span",
];
const CLASS_TAGS: &[&str] = &["div", "span", "code"];

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("formatter patterns are valid")
}

/// Text that has already been HTML-escaped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscapedHtml(String);

impl EscapedHtml {
    pub fn escape(raw: &str) -> Self {
        let mut out = String::with_capacity(raw.len());
        for c in raw.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#39;"),
                _ => out.push(c),
            }
        }
        Self(out)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    /// Raw text not yet claimed by any stage
    Text(String),
    Fence { lang: String, code: EscapedHtml },
    Code(EscapedHtml),
    Strong(String),
    Emphasis(String),
}

#[derive(Debug)]
enum Line {
    Tokens(Vec<Token>),
    Fence { lang: String, code: EscapedHtml },
}

#[derive(Debug)]
enum Block {
    Paragraph(Vec<Vec<Token>>),
    List { ordered: bool, items: Vec<Vec<Token>> },
    Fence { lang: String, code: EscapedHtml },
}

/// Split every `Text` token around the matches of `pattern`
fn split_text(
    tokens: Vec<Token>,
    pattern: &Regex,
    make: impl Fn(&Captures<'_>) -> Token,
) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    for token in tokens {
        let Token::Text(text) = token else {
            out.push(token);
            continue;
        };

        let mut last = 0;
        for caps in pattern.captures_iter(&text) {
            let Some(whole) = caps.get(0) else { continue };
            if whole.start() > last {
                out.push(Token::Text(text[last..whole.start()].to_string()));
            }
            out.push(make(&caps));
            last = whole.end();
        }
        if last < text.len() {
            out.push(Token::Text(text[last..].to_string()));
        }
    }
    out
}

/// Stages 1 to 4
fn tokenize(raw: &str) -> Vec<Token> {
    let tokens = vec![Token::Text(raw.to_string())];
    let tokens = split_text(tokens, &FENCE, |c| Token::Fence {
        lang: c[1].to_string(),
        code: EscapedHtml::escape(&c[2].replace("\r\n", "\n")),
    });
    let tokens = split_text(tokens, &INLINE_CODE, |c| {
        Token::Code(EscapedHtml::escape(&c[1]))
    });
    let tokens = split_text(tokens, &BOLD, |c| Token::Strong(c[1].to_string()));
    split_text(tokens, &ITALIC, |c| Token::Emphasis(c[1].to_string()))
}

fn into_lines(tokens: Vec<Token>) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut current = Vec::new();

    for token in tokens {
        match token {
            Token::Text(text) => {
                let mut segments = text.split('\n').map(|s| s.trim_end_matches('\r'));
                if let Some(first) = segments.next() {
                    if !first.is_empty() {
                        current.push(Token::Text(first.to_string()));
                    }
                }
                for segment in segments {
                    lines.push(Line::Tokens(std::mem::take(&mut current)));
                    if !segment.is_empty() {
                        current.push(Token::Text(segment.to_string()));
                    }
                }
            }
            Token::Fence { lang, code } => {
                if !current.is_empty() {
                    lines.push(Line::Tokens(std::mem::take(&mut current)));
                }
                lines.push(Line::Fence { lang, code });
            }
            other => current.push(other),
        }
    }
    if !current.is_empty() {
        lines.push(Line::Tokens(current));
    }
    lines
}

fn is_blank(tokens: &[Token]) -> bool {
    tokens
        .iter()
        .all(|t| matches!(t, Token::Text(text) if text.trim().is_empty()))
}

/// The item content of a list line, and whether the list is ordered
fn list_item(line: &[Token]) -> Option<(bool, Vec<Token>)> {
    let Some(Token::Text(first)) = line.first() else {
        return None;
    };
    let caps = LIST_MARKER.captures(first)?;
    let marker_end = caps.get(0)?.end();
    let ordered = caps.get(1).is_some();

    let mut item = Vec::with_capacity(line.len());
    if marker_end < first.len() {
        item.push(Token::Text(first[marker_end..].to_string()));
    }
    item.extend(line[1..].iter().cloned());

    if is_blank(&item) {
        return None;
    }
    Some((ordered, item))
}

/// Stages 5 and 6
fn into_blocks(lines: Vec<Line>) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut current: Option<Block> = None;

    for line in lines {
        let tokens = match line {
            Line::Fence { lang, code } => {
                blocks.extend(current.take());
                blocks.push(Block::Fence { lang, code });
                continue;
            }
            Line::Tokens(tokens) => tokens,
        };

        if is_blank(&tokens) {
            blocks.extend(current.take());
            continue;
        }

        match list_item(&tokens) {
            Some((ordered, item)) => {
                let continues =
                    matches!(&current, Some(Block::List { ordered: o, .. }) if *o == ordered);
                if continues {
                    if let Some(Block::List { items, .. }) = current.as_mut() {
                        items.push(item);
                    }
                } else {
                    blocks.extend(current.take());
                    current = Some(Block::List {
                        ordered,
                        items: vec![item],
                    });
                }
            }
            None => {
                if let Some(Block::Paragraph(lines)) = current.as_mut() {
                    lines.push(tokens);
                } else {
                    blocks.extend(current.take());
                    current = Some(Block::Paragraph(vec![tokens]));
                }
            }
        }
    }
    blocks.extend(current);
    blocks
}

fn render_fence(lang: &str, code: &EscapedHtml, out: &mut String) {
    let lang = EscapedHtml::escape(lang);
    let label = if lang.as_str().is_empty() {
        "code"
    } else {
        lang.as_str()
    };
    out.push_str(&format!(
        r#"<div class="code-block"><div class="code-header"><span class="code-language">{}</span></div><pre><code class="{}">{}</code></pre></div>"#,
        label,
        lang.as_str(),
        code.as_str()
    ));
}

fn render_inline(tokens: &[Token], out: &mut String) {
    for token in tokens {
        match token {
            Token::Text(text) => out.push_str(EscapedHtml::escape(text).as_str()),
            Token::Code(code) => {
                out.push_str("<code>");
                out.push_str(code.as_str());
                out.push_str("</code>");
            }
            Token::Strong(text) => {
                out.push_str("<strong>");
                out.push_str(EscapedHtml::escape(text).as_str());
                out.push_str("</strong>");
            }
            Token::Emphasis(text) => {
                out.push_str("<em>");
                out.push_str(EscapedHtml::escape(text).as_str());
                out.push_str("</em>");
            }
            Token::Fence { lang, code } => render_fence(lang, code, out),
        }
    }
}

fn render(raw: &str) -> String {
    let blocks = into_blocks(into_lines(tokenize(raw)));

    let mut out = String::with_capacity(raw.len() * 2);
    for block in &blocks {
        match block {
            Block::Paragraph(lines) => {
                out.push_str("<p>");
                for (i, line) in lines.iter().enumerate() {
                    if i > 0 {
                        out.push('\n');
                    }
                    render_inline(line, &mut out);
                }
                out.push_str("</p>");
            }
            Block::List { ordered, items } => {
                let tag = if *ordered { "ol" } else { "ul" };
                out.push_str(&format!("<{}>", tag));
                for item in items {
                    out.push_str("<li>");
                    render_inline(item, &mut out);
                    out.push_str("</li>");
                }
                out.push_str(&format!("</{}>", tag));
            }
            Block::Fence { lang, code } => render_fence(lang, code, &mut out),
        }
    }
    out
}

/// Keep only the markup the formatter itself produces
pub fn sanitize(html: &str) -> String {
    let mut builder = ammonia::Builder::empty();
    builder
        .add_tags(ALLOWED_TAGS)
        .add_clean_content_tags(&["script", "style"]);
    for tag in CLASS_TAGS {
        builder.add_tag_attributes(*tag, &["class"]);
    }
    builder.clean(html).to_string()
}

/// Format raw model output as sanitized HTML
pub fn format(raw: &str) -> String {
    sanitize(&render(raw))
}
