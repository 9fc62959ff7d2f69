use crate::domain::PageId;
use derive_more::derive::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
pub enum HeadingLevel {
    #[display("1")]
    H1,
    #[display("2")]
    H2,
    #[display("3")]
    H3,
}

impl HeadingLevel {
    pub fn from_number(level: u8) -> Option<Self> {
        match level {
            1 => Some(HeadingLevel::H1),
            2 => Some(HeadingLevel::H2),
            3 => Some(HeadingLevel::H3),
            _ => None,
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            HeadingLevel::H1 => "# ",
            HeadingLevel::H2 => "## ",
            HeadingLevel::H3 => "### ",
        }
    }
}

/// One line of dialect text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBlock {
    Paragraph { text: String },
    Heading { level: HeadingLevel, text: String },
    ListItem { text: String },
    HorizontalRule,
    PageLink { target_id: PageId, title_snapshot: String },
    Blank,
}

impl ContentBlock {
    pub fn paragraph(text: impl Into<String>) -> Self {
        ContentBlock::Paragraph { text: text.into() }
    }

    pub fn heading(level: HeadingLevel, text: impl Into<String>) -> Self {
        ContentBlock::Heading {
            level,
            text: text.into(),
        }
    }

    pub fn list_item(text: impl Into<String>) -> Self {
        ContentBlock::ListItem { text: text.into() }
    }

    pub fn page_link(target_id: PageId, title_snapshot: impl Into<String>) -> Self {
        ContentBlock::PageLink {
            target_id,
            title_snapshot: title_snapshot.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, ContentBlock::Blank)
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            ContentBlock::Paragraph { text }
            | ContentBlock::Heading { text, .. }
            | ContentBlock::ListItem { text } => Some(text),
            _ => None,
        }
    }

    /// Equality that ignores `PageLink::title_snapshot`, which is only a display cache.
    pub fn same_structure(&self, other: &ContentBlock) -> bool {
        match (self, other) {
            (
                ContentBlock::PageLink { target_id: a, .. },
                ContentBlock::PageLink { target_id: b, .. },
            ) => a == b,
            _ => self == other,
        }
    }
}

pub fn same_structure(a: &[ContentBlock], b: &[ContentBlock]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_structure(y))
}

/// Ids of every page-link in document order, duplicates included.
pub fn linked_page_ids(blocks: &[ContentBlock]) -> Vec<PageId> {
    blocks
        .iter()
        .filter_map(|block| match block {
            ContentBlock::PageLink { target_id, .. } => Some(*target_id),
            _ => None,
        })
        .collect()
}
