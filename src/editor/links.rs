use crate::domain::ContentBlock;
use crate::parser::{parse_line, serialize_block};
use crate::repository::PageRepository;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkResolution {
    pub resolved: usize,
    pub failed: usize,
}

/// Refreshes every page-link's title snapshot from the referenced page.
///
/// Links are fetched one at a time. A failed fetch keeps that link's stored snapshot and
/// is logged; it never stops the remaining links from resolving.
pub async fn resolve_page_links(
    blocks: &mut [ContentBlock],
    repo: &dyn PageRepository,
) -> LinkResolution {
    let mut report = LinkResolution::default();

    for block in blocks.iter_mut() {
        let ContentBlock::PageLink {
            target_id,
            title_snapshot,
        } = block
        else {
            continue;
        };

        match repo.get_by_id(*target_id).await {
            Ok(page) => {
                if *title_snapshot != page.title {
                    debug!(page_id = *target_id, title = %page.title, "Refreshed link title");
                }
                *title_snapshot = page.title;
                report.resolved += 1;
            }
            Err(e) => {
                warn!(page_id = *target_id, error = %e, "Failed to resolve linked page, keeping stored title");
                report.failed += 1;
            }
        }
    }

    report
}

/// Line-wise variant for raw dialect text: only page-link lines are rewritten, every
/// other line is kept byte for byte.
pub async fn resolve_dialect_links(content: &str, repo: &dyn PageRepository) -> String {
    let mut lines = Vec::new();
    for line in content.split('\n') {
        let (body, ending) = match line.strip_suffix('\r') {
            Some(body) => (body, "\r"),
            None => (line, ""),
        };

        let mut block = [parse_line(body)];
        let is_link = matches!(block[0], ContentBlock::PageLink { .. });
        if is_link && resolve_page_links(&mut block, repo).await.resolved > 0 {
            lines.push(format!("{}{}", serialize_block(&block[0]), ending));
        } else {
            lines.push(line.to_string());
        }
    }
    lines.join("\n")
}
