use crate::domain::{ContentBlock, HeadingLevel, PageId};
use crate::editor::surface::{BlockMarker, Element, MarkdownPrefix, Surface, SurfaceNode};

const BULLET: &str = "•";
const RULE_FILLER: &str = "\u{a0}";

/// One surface node per block.
pub fn mount(blocks: &[ContentBlock]) -> Surface {
    Surface::new(blocks.iter().map(mount_block).collect())
}

pub fn mount_block(block: &ContentBlock) -> SurfaceNode {
    match block {
        ContentBlock::Paragraph { text } => SurfaceNode::text(text.clone()),
        ContentBlock::Heading { level, text } => heading_node(*level, text),
        ContentBlock::ListItem { text } => list_item_node(text),
        ContentBlock::HorizontalRule => rule_node(),
        ContentBlock::PageLink {
            target_id,
            title_snapshot,
        } => page_link_node(*target_id, title_snapshot),
        ContentBlock::Blank => SurfaceNode::LineBreak,
    }
}

pub fn heading_node(level: HeadingLevel, text: &str) -> SurfaceNode {
    let tag = match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
    };
    SurfaceNode::Element(
        Element::new(tag)
            .marked(BlockMarker::Prefix(MarkdownPrefix::Heading(level)))
            .child(SurfaceNode::text(text)),
    )
}

pub fn list_item_node(text: &str) -> SurfaceNode {
    SurfaceNode::Element(
        Element::new("div")
            .marked(BlockMarker::Prefix(MarkdownPrefix::ListItem))
            .child(SurfaceNode::Element(
                Element::new("span")
                    .read_only()
                    .child(SurfaceNode::text(BULLET)),
            ))
            .child(SurfaceNode::Element(
                Element::new("span").child(SurfaceNode::text(text)),
            )),
    )
}

pub fn rule_node() -> SurfaceNode {
    SurfaceNode::Element(
        Element::new("div")
            .marked(BlockMarker::Prefix(MarkdownPrefix::Rule))
            .read_only()
            .child(SurfaceNode::text(RULE_FILLER)),
    )
}

pub fn page_link_node(target_id: PageId, title: &str) -> SurfaceNode {
    SurfaceNode::Element(
        Element::new("div")
            .marked(BlockMarker::PageLink {
                target_id,
                title: title.to_string(),
            })
            .read_only()
            .child(SurfaceNode::Element(
                Element::new("span").child(SurfaceNode::text(title)),
            )),
    )
}

/// Depth-first walk back to blocks. Pure, so extracting an unchanged surface twice
/// yields identical lists.
pub fn extract(surface: &Surface) -> Vec<ContentBlock> {
    let mut blocks = Vec::new();
    for node in &surface.nodes {
        walk(node, &mut blocks);
    }
    blocks
}

fn walk(node: &SurfaceNode, blocks: &mut Vec<ContentBlock>) {
    match node {
        SurfaceNode::LineBreak => blocks.push(ContentBlock::Blank),
        SurfaceNode::Text(text) => {
            // stray whitespace between nodes is layout, not content
            if !text.trim().is_empty() || text.contains('\n') {
                blocks.push(ContentBlock::paragraph(text.clone()));
            }
        }
        SurfaceNode::Element(element) => match &element.marker {
            Some(BlockMarker::PageLink { target_id, title }) => {
                blocks.push(ContentBlock::page_link(*target_id, title.clone()));
            }
            Some(BlockMarker::Prefix(prefix)) => {
                blocks.push(block_for_prefix(*prefix, node.editable_text()));
            }
            None => {
                for child in &element.children {
                    walk(child, blocks);
                }
            }
        },
    }
}

fn block_for_prefix(prefix: MarkdownPrefix, text: String) -> ContentBlock {
    match prefix {
        MarkdownPrefix::Heading(level) => ContentBlock::Heading { level, text },
        MarkdownPrefix::ListItem => ContentBlock::ListItem { text },
        MarkdownPrefix::Rule => ContentBlock::HorizontalRule,
    }
}
