//! The editable surface: a small typed node tree standing in for the host's DOM.
//!
//! Nodes carry an optional [`BlockMarker`] that records which dialect construct they came
//! from. Extraction reads only these markers, never tag names or styling.

use crate::domain::{HeadingLevel, PageId};
use crate::parser::{escape_html, render_inline_html};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkdownPrefix {
    Heading(HeadingLevel),
    ListItem,
    Rule,
}

impl MarkdownPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkdownPrefix::Heading(level) => level.prefix(),
            MarkdownPrefix::ListItem => "- ",
            MarkdownPrefix::Rule => "---",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockMarker {
    Prefix(MarkdownPrefix),
    PageLink { target_id: PageId, title: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: &'static str,
    pub marker: Option<BlockMarker>,
    pub editable: bool,
    pub children: Vec<SurfaceNode>,
}

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            marker: None,
            editable: true,
            children: Vec::new(),
        }
    }

    pub fn marked(mut self, marker: BlockMarker) -> Self {
        self.marker = Some(marker);
        self
    }

    pub fn read_only(mut self) -> Self {
        self.editable = false;
        self
    }

    pub fn child(mut self, node: SurfaceNode) -> Self {
        self.children.push(node);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceNode {
    Element(Element),
    Text(String),
    LineBreak,
}

impl SurfaceNode {
    pub fn text(text: impl Into<String>) -> Self {
        SurfaceNode::Text(text.into())
    }

    /// Text the user can edit: read-only subtrees (bullets, rule filler) are skipped.
    pub fn editable_text(&self) -> String {
        let mut out = String::new();
        self.collect_editable_text(&mut out);
        out
    }

    fn collect_editable_text(&self, out: &mut String) {
        match self {
            SurfaceNode::Text(text) => out.push_str(text),
            SurfaceNode::LineBreak => {}
            SurfaceNode::Element(element) if element.editable => {
                for child in &element.children {
                    child.collect_editable_text(out);
                }
            }
            SurfaceNode::Element(_) => {}
        }
    }

    /// Path (relative to this node) of the first text node inside an editable subtree.
    pub fn first_editable_text_path(&self) -> Option<Vec<usize>> {
        match self {
            SurfaceNode::Text(_) => Some(Vec::new()),
            SurfaceNode::Element(element) if element.editable => {
                element.children.iter().enumerate().find_map(|(i, child)| {
                    child.first_editable_text_path().map(|mut rest| {
                        rest.insert(0, i);
                        rest
                    })
                })
            }
            _ => None,
        }
    }
}

/// A text position: `path` addresses a text node from the surface root, `offset` counts chars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caret {
    pub path: Vec<usize>,
    pub offset: usize,
}

impl Caret {
    pub fn new(path: Vec<usize>, offset: usize) -> Self {
        Self { path, offset }
    }

    /// Index of the top-level line holding the caret.
    pub fn line(&self) -> usize {
        self.path.first().copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("caret {0:?} is not in a text node")]
    InvalidCaret(Caret),
    #[error("caret {0:?} is inside read-only content")]
    NotEditable(Caret),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Surface {
    pub nodes: Vec<SurfaceNode>,
}

impl Surface {
    pub fn new(nodes: Vec<SurfaceNode>) -> Self {
        Self { nodes }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, path: &[usize]) -> Option<&SurfaceNode> {
        let (first, rest) = path.split_first()?;
        let mut node = self.nodes.get(*first)?;
        for index in rest {
            match node {
                SurfaceNode::Element(element) => node = element.children.get(*index)?,
                _ => return None,
            }
        }
        Some(node)
    }

    pub fn node_mut(&mut self, path: &[usize]) -> Option<&mut SurfaceNode> {
        let (first, rest) = path.split_first()?;
        let mut node = self.nodes.get_mut(*first)?;
        for index in rest {
            match node {
                SurfaceNode::Element(element) => node = element.children.get_mut(*index)?,
                _ => return None,
            }
        }
        Some(node)
    }

    // every ancestor on the path must be editable for a caret to land there
    fn is_editable_path(&self, path: &[usize]) -> bool {
        (1..path.len()).all(|depth| match self.node(&path[..depth]) {
            Some(SurfaceNode::Element(element)) => element.editable,
            _ => false,
        })
    }

    fn text_at(&self, caret: &Caret) -> Result<&String, SurfaceError> {
        match self.node(&caret.path) {
            Some(SurfaceNode::Text(text)) if caret.offset <= text.chars().count() => {
                if self.is_editable_path(&caret.path) {
                    Ok(text)
                } else {
                    Err(SurfaceError::NotEditable(caret.clone()))
                }
            }
            _ => Err(SurfaceError::InvalidCaret(caret.clone())),
        }
    }

    fn text_at_mut(&mut self, caret: &Caret) -> Result<&mut String, SurfaceError> {
        self.text_at(caret)?;
        match self.node_mut(&caret.path) {
            Some(SurfaceNode::Text(text)) => Ok(text),
            _ => Err(SurfaceError::InvalidCaret(caret.clone())),
        }
    }

    /// Text of the caret's text node up to the caret.
    pub fn text_before(&self, caret: &Caret) -> Option<String> {
        self.text_at(caret)
            .ok()
            .map(|text| text.chars().take(caret.offset).collect())
    }

    pub fn insert_text(&mut self, caret: &Caret, input: &str) -> Result<Caret, SurfaceError> {
        let text = self.text_at_mut(caret)?;
        let at = byte_offset(text, caret.offset);
        text.insert_str(at, input);
        Ok(Caret::new(caret.path.clone(), caret.offset + input.chars().count()))
    }

    pub fn delete_backward(&mut self, caret: &Caret) -> Result<Caret, SurfaceError> {
        if caret.offset == 0 {
            self.text_at(caret)?;
            return Ok(caret.clone());
        }
        let text = self.text_at_mut(caret)?;
        let start = byte_offset(text, caret.offset - 1);
        let end = byte_offset(text, caret.offset);
        text.replace_range(start..end, "");
        Ok(Caret::new(caret.path.clone(), caret.offset - 1))
    }

    /// Removes a `/` immediately before the caret. Returns the caret and whether one was removed.
    pub fn remove_trigger(&mut self, caret: &Caret, trigger: char) -> Result<(Caret, bool), SurfaceError> {
        let ends_with_trigger = self
            .text_before(caret)
            .is_some_and(|before| before.ends_with(trigger));
        if !ends_with_trigger {
            self.text_at(caret)?;
            return Ok((caret.clone(), false));
        }
        self.delete_backward(caret).map(|c| (c, true))
    }

    /// Splits the caret's line. A root text node is cut in two lines, and an empty half
    /// before the caret becomes a blank line. Any other line gets a fresh text line after it.
    pub fn insert_line_break(&mut self, caret: &Caret) -> Result<Caret, SurfaceError> {
        self.text_at(caret)?;
        let line = caret.line();

        if caret.path.len() == 1 {
            if let Some(SurfaceNode::Text(text)) = self.nodes.get_mut(line) {
                let at = byte_offset(text, caret.offset);
                let after = text.split_off(at);
                if text.is_empty() {
                    self.nodes[line] = SurfaceNode::LineBreak;
                }
                self.nodes.insert(line + 1, SurfaceNode::Text(after));
                return Ok(Caret::new(vec![line + 1], 0));
            }
        }

        Ok(self.open_line_after(line, Vec::new()))
    }

    /// Replaces the whole top-level line with `nodes` and returns the replaced node.
    pub fn replace_line(&mut self, line: usize, nodes: Vec<SurfaceNode>) -> Option<SurfaceNode> {
        if line >= self.nodes.len() {
            return None;
        }
        let removed = self.nodes.remove(line);
        for (i, node) in nodes.into_iter().enumerate() {
            self.nodes.insert(line + i, node);
        }
        Some(removed)
    }

    /// Inserts `nodes` and then an empty text line after `line`; caret lands in the text.
    pub fn open_line_after(&mut self, line: usize, nodes: Vec<SurfaceNode>) -> Caret {
        let mut at = (line + 1).min(self.nodes.len());
        for node in nodes {
            self.nodes.insert(at, node);
            at += 1;
        }
        self.nodes.insert(at, SurfaceNode::text(""));
        Caret::new(vec![at], 0)
    }

    /// Appends an empty text line and returns a caret in it.
    pub fn push_empty_line(&mut self) -> Caret {
        self.nodes.push(SurfaceNode::text(""));
        Caret::new(vec![self.nodes.len() - 1], 0)
    }

    /// Caret at the end of the last editable text, if any line has one.
    pub fn end_caret(&self) -> Option<Caret> {
        self.nodes.iter().enumerate().rev().find_map(|(i, node)| {
            node.first_editable_text_path().map(|mut rest| {
                rest.insert(0, i);
                let offset = match self.node(&rest) {
                    Some(SurfaceNode::Text(text)) => text.chars().count(),
                    _ => 0,
                };
                Caret::new(rest, offset)
            })
        })
    }

    pub fn to_html(&self) -> String {
        let mut html = String::new();
        for node in &self.nodes {
            render_node(node, &mut html);
        }
        html
    }
}

fn render_node(node: &SurfaceNode, html: &mut String) {
    match node {
        SurfaceNode::Text(text) => html.push_str(&render_inline_html(text)),
        SurfaceNode::LineBreak => html.push_str("<br>"),
        SurfaceNode::Element(element) => {
            html.push('<');
            html.push_str(element.tag);
            match &element.marker {
                Some(BlockMarker::Prefix(prefix)) => {
                    html.push_str(&format!(" data-md=\"{}\"", prefix.as_str()));
                }
                Some(BlockMarker::PageLink { target_id, title }) => {
                    html.push_str(&format!(
                        " data-page-id=\"{}\" data-page-title=\"{}\"",
                        target_id,
                        escape_html(title)
                    ));
                }
                None => {}
            }
            if !element.editable {
                html.push_str(" contenteditable=\"false\"");
            }
            html.push('>');
            for child in &element.children {
                render_node(child, html);
            }
            html.push_str("</");
            html.push_str(element.tag);
            html.push('>');
        }
    }
}

fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map_or(text.len(), |(i, _)| i)
}
