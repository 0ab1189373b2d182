//! Conversion between rich-text markup and the on-disk markdown body
//!
//! Notes are held in memory as an HTML-like markup string and stored on disk
//! as markdown with an optional trailing metadata comment:
//!
//! ```text
//! <!-- scribble-metadata: {"color":"#fff9c4","pinned":true} -->
//! ```
//!
//! Conversion is intentionally lossy in both directions. Nothing in this
//! module returns an error: malformed input degrades to "no metadata" or
//! plain paragraph text rather than failing a save.

use pulldown_cmark::{html, Options, Parser};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};

/// Non-text note properties carried in the metadata comment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
}

impl NoteMetadata {
    /// True when no property is set and no comment should be written
    pub fn is_empty(&self) -> bool {
        self.color.is_none() && self.pinned.is_none()
    }
}

/// Convert a markdown body to rich-text markup
///
/// Empty input yields an empty-paragraph placeholder so the editor always
/// has a block to put the caret in.
pub fn markdown_to_rich_text(markdown: &str) -> String {
    if markdown.trim().is_empty() {
        return "<p></p>".to_string();
    }
    let parser = Parser::new_ext(markdown, Options::ENABLE_STRIKETHROUGH);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out.trim_end().to_string()
}

/// Convert rich-text markup back to a markdown body
///
/// Handles the tag subset the editor produces: `h1`-`h3`, `p`, `ul`/`ol`/`li`,
/// `pre`/`code`, `blockquote`, `strong`/`b`, `em`/`i`, inline `code`, `br` and
/// `hr`. Unknown tags are stripped and their text kept.
pub fn rich_text_to_markdown(markup: &str) -> String {
    let mut writer = MarkdownWriter::default();
    for token in tokenize(markup) {
        writer.handle(token);
    }
    writer.finish()
}

/// Strip a trailing metadata comment from file text
///
/// Returns the decoded metadata and the content without the comment line.
/// A comment with malformed JSON is tolerated: the metadata comes back empty
/// and the content is returned unchanged.
pub fn extract_metadata(text: &str) -> (NoteMetadata, String) {
    let re = match Regex::new(r"<!-- scribble-metadata: (.*?) -->") {
        Ok(re) => re,
        Err(_) => return (NoteMetadata::default(), text.to_string()),
    };
    if let Some(caps) = re.captures_iter(text).last() {
        if let (Some(whole), Some(json)) = (caps.get(0), caps.get(1)) {
            // Only a comment at the very end of the file counts
            if text[whole.end()..].trim().is_empty() {
                if let Ok(meta) = serde_json::from_str::<NoteMetadata>(json.as_str()) {
                    return (meta, text[..whole.start()].trim_end().to_string());
                }
            }
        }
    }
    (NoteMetadata::default(), text.to_string())
}

/// Append a metadata comment to content, if there is anything to record
pub fn embed_metadata(content: &str, metadata: &NoteMetadata) -> String {
    if metadata.is_empty() {
        return content.to_string();
    }
    let json = serde_json::to_string(metadata).unwrap_or_default();
    format!("{}\n\n<!-- scribble-metadata: {} -->", content.trim_end(), json)
}

/// A minimal tag-level token for the rich-text scanner
#[derive(Debug)]
enum Token {
    Open(String, String),
    Close(String),
    Text(String),
}

/// Split markup into tags and text runs; no nesting validation
fn tokenize(markup: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = markup;
    while let Some(lt) = rest.find('<') {
        if lt > 0 {
            tokens.push(Token::Text(rest[..lt].to_string()));
        }
        match rest[lt..].find('>') {
            Some(gt) => {
                let inner = &rest[lt + 1..lt + gt];
                let closing = inner.starts_with('/');
                let inner = inner.trim_start_matches('/').trim_end_matches('/').trim();
                let (name, attrs) = match inner.split_once(char::is_whitespace) {
                    Some((n, a)) => (n, a),
                    None => (inner, ""),
                };
                let name = name.to_ascii_lowercase();
                if closing {
                    tokens.push(Token::Close(name));
                } else {
                    tokens.push(Token::Open(name, attrs.to_string()));
                }
                rest = &rest[lt + gt + 1..];
            }
            None => {
                // Unterminated tag, keep it as text
                tokens.push(Token::Text(rest[lt..].to_string()));
                rest = "";
            }
        }
    }
    if !rest.is_empty() {
        tokens.push(Token::Text(rest.to_string()));
    }
    tokens
}

#[derive(Debug)]
struct ListState {
    ordered: bool,
    index: u64,
    first_item: bool,
}

#[derive(Debug, Default)]
struct MarkdownWriter {
    out: String,
    lists: Vec<ListState>,
    quote_depth: usize,
    in_pre: bool,
    fence_open: bool,
}

impl MarkdownWriter {
    fn handle(&mut self, token: Token) {
        match token {
            Token::Open(name, attrs) => self.open_tag(&name, &attrs),
            Token::Close(name) => self.close_tag(&name),
            Token::Text(text) => self.text(&text),
        }
    }

    fn open_tag(&mut self, name: &str, attrs: &str) {
        match name {
            "p" => self.start_block(),
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                self.start_block();
                let level = name[1..].parse::<usize>().unwrap_or(1).min(6);
                self.out.push_str(&"#".repeat(level));
                self.out.push(' ');
            }
            "ul" | "ol" => self.lists.push(ListState {
                ordered: name == "ol",
                index: ordered_start(attrs),
                first_item: true,
            }),
            "li" => self.list_item(),
            "pre" => {
                self.start_block();
                self.out.push_str("```");
                self.in_pre = true;
                self.fence_open = true;
            }
            "code" if self.in_pre && self.fence_open => {
                self.out.push_str(&code_language(attrs));
                self.out.push('\n');
                self.fence_open = false;
            }
            "code" if !self.in_pre => self.out.push('`'),
            "blockquote" => self.quote_depth += 1,
            "strong" | "b" => self.out.push_str("**"),
            "em" | "i" => self.out.push('*'),
            "br" => {
                self.out.push_str("  \n");
                self.out.push_str(&"> ".repeat(self.quote_depth));
            }
            "hr" => {
                self.start_block();
                self.out.push_str("---");
            }
            _ => {}
        }
    }

    fn close_tag(&mut self, name: &str) {
        match name {
            "ul" | "ol" => {
                self.lists.pop();
            }
            "pre" => {
                if !self.out.ends_with('\n') {
                    self.out.push('\n');
                }
                self.out.push_str("```");
                self.in_pre = false;
                self.fence_open = false;
            }
            "code" if !self.in_pre => self.out.push('`'),
            "blockquote" => self.quote_depth = self.quote_depth.saturating_sub(1),
            "strong" | "b" => self.out.push_str("**"),
            "em" | "i" => self.out.push('*'),
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.in_pre {
            if self.fence_open {
                self.out.push('\n');
                self.fence_open = false;
            }
            self.out.push_str(&unescape_entities(text));
            return;
        }
        if text.trim().is_empty() {
            return;
        }
        // Drop structural newlines the html writer put between tags
        let text = if self.out.ends_with('\n') {
            text.trim_start_matches('\n')
        } else {
            text
        };
        self.out.push_str(&unescape_entities(text));
    }

    /// Begin a new block: blank-line separation plus quote prefix
    fn start_block(&mut self) {
        if !self.out.is_empty() {
            self.out.push_str("\n\n");
        }
        self.out.push_str(&"> ".repeat(self.quote_depth));
    }

    fn list_item(&mut self) {
        let depth = self.lists.len();
        let (marker, first) = match self.lists.last_mut() {
            Some(list) => {
                let first = list.first_item;
                list.first_item = false;
                let marker = if list.ordered {
                    let m = format!("{}. ", list.index);
                    list.index += 1;
                    m
                } else {
                    "- ".to_string()
                };
                (marker, first)
            }
            None => ("- ".to_string(), false),
        };
        if first && depth <= 1 {
            self.start_block();
        } else {
            self.out.push('\n');
            self.out.push_str(&"> ".repeat(self.quote_depth));
        }
        self.out.push_str(&"  ".repeat(depth.saturating_sub(1)));
        self.out.push_str(&marker);
    }

    fn finish(self) -> String {
        self.out.trim().to_string()
    }
}

/// Pull the start index out of an `<ol start="3">` attribute string
fn ordered_start(attrs: &str) -> u64 {
    Regex::new(r#"start="(\d+)""#)
        .ok()
        .and_then(|re| re.captures(attrs).and_then(|c| c.get(1)?.as_str().parse().ok()))
        .unwrap_or(1)
}

/// Pull the fence language out of a `class="language-x"` attribute string
fn code_language(attrs: &str) -> String {
    Regex::new(r"language-([A-Za-z0-9_+-]+)")
        .ok()
        .and_then(|re| {
            re.captures(attrs)
                .and_then(|c| c.get(1).map(|m| m.as_str().to_string()))
        })
        .unwrap_or_default()
}

fn unescape_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
