//! Editable-tree adapter: keeps a [`Surface`] and the dialect in sync and runs the `/`
//! command menu.

pub mod adapter;
pub mod links;
pub mod menu;
pub mod surface;

use crate::domain::{ContentBlock, PageId, PageInput, PageRecord};
use crate::parser::{parse_dialect, serialize_dialect};
use crate::repository::PageRepository;
use chrono::Utc;
use tracing::{error, info};

pub use adapter::{extract, mount};
pub use links::{resolve_dialect_links, resolve_page_links, LinkResolution};
pub use menu::{CommandMenu, MenuAction, MenuOption, MenuPosition, MENU_OPTIONS, TRIGGER};
pub use surface::{BlockMarker, Caret, Element, MarkdownPrefix, Surface, SurfaceError, SurfaceNode};

pub const NEW_LINKED_PAGE_TITLE: &str = "Novo Fóton";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Enter,
    Backspace,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MenuOutcome {
    Applied(MenuAction),
    LinkedPageCreated(PageRecord),
    /// The create call failed; the trigger is gone but nothing was inserted.
    LinkFailed,
    /// No caret to act on.
    Ignored,
}

#[derive(Debug, Clone, Default)]
pub struct Editor {
    surface: Surface,
    caret: Option<Caret>,
    menu: CommandMenu,
}

impl Editor {
    pub fn from_blocks(blocks: &[ContentBlock]) -> Self {
        let surface = mount(blocks);
        let caret = surface.end_caret();
        Self {
            surface,
            caret,
            menu: CommandMenu::default(),
        }
    }

    pub fn from_dialect(content: &str) -> Self {
        Self::from_blocks(&parse_dialect(content))
    }

    /// Mounts stored content after refreshing page-link titles from the repository.
    pub async fn load(content: &str, repo: &dyn PageRepository) -> (Self, LinkResolution) {
        let mut blocks = parse_dialect(content);
        let report = resolve_page_links(&mut blocks, repo).await;
        (Self::from_blocks(&blocks), report)
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn caret(&self) -> Option<&Caret> {
        self.caret.as_ref()
    }

    pub fn menu(&self) -> &CommandMenu {
        &self.menu
    }

    pub fn blocks(&self) -> Vec<ContentBlock> {
        extract(&self.surface)
    }

    pub fn to_dialect(&self) -> String {
        serialize_dialect(&self.blocks())
    }

    pub fn to_html(&self) -> String {
        self.surface.to_html()
    }

    pub fn place_caret(&mut self, caret: Caret) {
        self.menu.observe(&self.surface, &caret);
        self.caret = Some(caret);
    }

    /// Caret into a fresh empty line at the end, for typing below existing content.
    pub fn start_new_line(&mut self) {
        let caret = if self.surface.is_empty() {
            self.surface.push_empty_line()
        } else {
            let last = self.surface.nodes.len() - 1;
            self.surface.open_line_after(last, Vec::new())
        };
        self.place_caret(caret);
    }

    pub fn type_text(&mut self, input: &str) -> Result<(), SurfaceError> {
        let caret = match self.caret.take() {
            Some(caret) => caret,
            None => self.surface.push_empty_line(),
        };
        match self.surface.insert_text(&caret, input) {
            Ok(next) => {
                self.place_caret(next);
                Ok(())
            }
            Err(e) => {
                self.caret = Some(caret);
                Err(e)
            }
        }
    }

    pub fn press_key(&mut self, key: Key) -> Result<(), SurfaceError> {
        match key {
            Key::Escape => {
                self.menu.close();
                Ok(())
            }
            Key::Enter => {
                let Some(caret) = self.caret.clone() else {
                    return Ok(());
                };
                let next = self.surface.insert_line_break(&caret)?;
                self.place_caret(next);
                Ok(())
            }
            Key::Backspace => {
                let Some(caret) = self.caret.clone() else {
                    return Ok(());
                };
                let next = self.surface.delete_backward(&caret)?;
                self.place_caret(next);
                Ok(())
            }
        }
    }

    /// Removes the trigger before the caret, then performs the structural insertion.
    ///
    /// `NewLinkedPage` creates the child page first and only touches the surface once the
    /// create call has answered. `parent` is the page being edited, if it exists yet.
    pub async fn select_menu_action(
        &mut self,
        action: MenuAction,
        repo: &dyn PageRepository,
        parent: Option<PageId>,
    ) -> Result<MenuOutcome, SurfaceError> {
        self.menu.close();

        let Some(caret) = self.caret.clone() else {
            return Ok(MenuOutcome::Ignored);
        };
        let (caret, _) = self.surface.remove_trigger(&caret, TRIGGER)?;
        self.caret = Some(caret.clone());
        let line = caret.line();

        let next = match action {
            MenuAction::Text => return Ok(MenuOutcome::Applied(action)),
            MenuAction::Heading(level) => {
                let text = self.line_text(line);
                self.retag_line(line, adapter::heading_node(level, &text))
            }
            MenuAction::ListItem => {
                let text = self.line_text(line);
                self.retag_line(line, adapter::list_item_node(&text))
            }
            MenuAction::HorizontalRule => self.insert_block_line(line, adapter::rule_node()),
            MenuAction::NewLinkedPage => {
                let mut input = PageInput::titled(NEW_LINKED_PAGE_TITLE, Utc::now());
                input.content = Some(String::new());
                input.parent_id = parent;

                match repo.create(&input).await {
                    Ok(page) => {
                        info!(page_id = page.id, parent_id = ?parent, "Created linked page");
                        let node = adapter::page_link_node(page.id, &page.title);
                        let next = self.insert_block_line(line, node);
                        self.place_caret(next);
                        return Ok(MenuOutcome::LinkedPageCreated(page));
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to create linked page");
                        return Ok(MenuOutcome::LinkFailed);
                    }
                }
            }
        };

        self.place_caret(next);
        Ok(MenuOutcome::Applied(action))
    }

    fn line_text(&self, line: usize) -> String {
        self.surface
            .nodes
            .get(line)
            .map(|node| node.editable_text())
            .unwrap_or_default()
    }

    // swaps the caret's line for `node`, caret at the end of its editable text
    fn retag_line(&mut self, line: usize, node: SurfaceNode) -> Caret {
        let inner = node.first_editable_text_path().unwrap_or_default();
        let offset = node.editable_text().chars().count();
        self.surface.replace_line(line, vec![node]);

        let mut path = vec![line];
        path.extend(inner);
        Caret::new(path, offset)
    }

    // an emptied line is taken over by the block, otherwise it goes below the line
    fn insert_block_line(&mut self, line: usize, node: SurfaceNode) -> Caret {
        let line_is_empty = matches!(self.surface.nodes.get(line), Some(SurfaceNode::Text(t)) if t.is_empty());
        if line_is_empty {
            self.surface.replace_line(line, vec![node]);
            return self.surface.open_line_after(line, Vec::new());
        }
        self.surface.open_line_after(line, vec![node])
    }
}
