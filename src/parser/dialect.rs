//! Line-oriented codec between dialect text and [`ContentBlock`]s.
//!
//! ```text
//! # Heading 1
//! ## Heading 2
//! ### Heading 3
//! - list item
//! ---
//! > [[page:<id>:<title-snapshot>]]
//! plain paragraph text
//! ```
//!
//! Parsing is total: every string yields a block list, malformed tokens become paragraphs.

use crate::domain::{ContentBlock, HeadingLevel, PageId};
use once_cell::sync::Lazy;
use regex::Regex;

pub const RULE_TOKEN: &str = "---";
pub const UNTITLED_LINK: &str = "Sem título";

// ascii digits only, `\d` would also accept other unicode digit classes
static PAGE_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^>\s*\[\[page:([0-9]+):(.+?)\]\]").expect("page-link pattern is valid")
});

pub fn parse_dialect(text: &str) -> Vec<ContentBlock> {
    if text.is_empty() {
        return Vec::new();
    }

    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    normalized.split('\n').map(parse_line).collect()
}

/// First match wins: page-link, rule, heading, list item, blank, paragraph.
pub fn parse_line(line: &str) -> ContentBlock {
    if let Some(link) = match_page_link(line) {
        return link;
    }

    if line.trim() == RULE_TOKEN {
        return ContentBlock::HorizontalRule;
    }

    for level in [HeadingLevel::H1, HeadingLevel::H2, HeadingLevel::H3] {
        if let Some(rest) = line.strip_prefix(level.prefix()) {
            return ContentBlock::heading(level, rest);
        }
    }

    if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return ContentBlock::list_item(rest);
    }

    if line.is_empty() {
        return ContentBlock::Blank;
    }

    ContentBlock::paragraph(line)
}

fn match_page_link(line: &str) -> Option<ContentBlock> {
    let captures = PAGE_LINK.captures(line)?;
    // ids that overflow fall through to a paragraph like any other malformed token
    let target_id = captures.get(1)?.as_str().parse::<PageId>().ok()?;
    let title = captures.get(2)?.as_str();
    Some(ContentBlock::page_link(target_id, title))
}

/// Joins one line per block; leading and trailing blank blocks are dropped.
pub fn serialize_dialect(blocks: &[ContentBlock]) -> String {
    let Some(start) = blocks.iter().position(|b| !b.is_blank()) else {
        return String::new();
    };
    let end = blocks
        .iter()
        .rposition(|b| !b.is_blank())
        .map_or(start, |i| i + 1);

    blocks[start..end]
        .iter()
        .map(serialize_block)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn serialize_block(block: &ContentBlock) -> String {
    match block {
        ContentBlock::Paragraph { text } => text.clone(),
        ContentBlock::Heading { level, text } => {
            format!("{}{}", level.prefix(), single_line(text))
        }
        ContentBlock::ListItem { text } => format!("- {}", single_line(text)),
        ContentBlock::HorizontalRule => RULE_TOKEN.to_string(),
        ContentBlock::PageLink {
            target_id,
            title_snapshot,
        } => page_link_token(*target_id, title_snapshot),
        ContentBlock::Blank => String::new(),
    }
}

pub fn page_link_token(target_id: PageId, title: &str) -> String {
    format!("> [[page:{}:{}]]", target_id, link_title(title))
}

fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

// the title must survive the lazy `(.+?)\]\]` match on the way back in
fn link_title(title: &str) -> String {
    let mut cleaned = single_line(title);
    while cleaned.contains("]]") {
        cleaned = cleaned.replace("]]", "]");
    }
    let cleaned = cleaned.trim_end_matches(']').trim();
    if cleaned.is_empty() {
        UNTITLED_LINK.to_string()
    } else {
        cleaned.to_string()
    }
}
