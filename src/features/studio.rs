use crate::domain::{PageId, RecordMode};
use crate::editor::{Editor, Key, LinkResolution, MenuAction, MenuOutcome, SurfaceError};
use crate::error::{RepositoryError, UploadError};
use crate::repository::PageRepository;
use crate::services::autosave::{AutosaveConfig, AutosaveCoordinator, EditFields, FieldEdit, SaveState};
use crate::services::Navigator;
use crate::storage::{ImagePayload, ImageUploader, IMAGES_FOLDER, THUMBNAILS_FOLDER};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    Image,
    Thumbnail,
}

impl ImageSlot {
    pub fn folder(&self) -> &'static str {
        match self {
            ImageSlot::Image => IMAGES_FOLDER,
            ImageSlot::Thumbnail => THUMBNAILS_FOLDER,
        }
    }
}

/// One open page: the editor surface wired to its autosave coordinator.
pub struct Studio {
    editor: Editor,
    autosave: AutosaveCoordinator,
    repo: Arc<dyn PageRepository>,
    links: LinkResolution,
}

impl Studio {
    /// Opens `/studio/new` or `/studio/<id>`. Existing pages are fetched and their page
    /// links resolved before the surface is mounted.
    pub async fn open(
        repo: Arc<dyn PageRepository>,
        navigator: Arc<dyn Navigator>,
        config: AutosaveConfig,
        mode: RecordMode,
        parent_id: Option<PageId>,
    ) -> Result<Self, RepositoryError> {
        match mode {
            RecordMode::New => {
                let autosave = AutosaveCoordinator::start_new(
                    repo.clone(),
                    navigator,
                    config,
                    EditFields::default(),
                    parent_id,
                );
                Ok(Self {
                    editor: Editor::default(),
                    autosave,
                    repo,
                    links: LinkResolution::default(),
                })
            }
            RecordMode::Existing(id) => {
                let record = repo.get_by_id(id).await?;
                let content = record.content.clone().unwrap_or_default();
                let (editor, links) = Editor::load(&content, repo.as_ref()).await;
                info!(page_id = id, resolved = links.resolved, failed = links.failed, "Opened page");

                let autosave = AutosaveCoordinator::start_existing(repo.clone(), navigator, config, &record);
                Ok(Self {
                    editor,
                    autosave,
                    repo,
                    links,
                })
            }
        }
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn autosave(&self) -> &AutosaveCoordinator {
        &self.autosave
    }

    pub fn links(&self) -> &LinkResolution {
        &self.links
    }

    pub async fn edit(&self, edit: FieldEdit) -> bool {
        self.autosave.edit(edit).await
    }

    pub async fn type_text(&mut self, input: &str) -> Result<bool, SurfaceError> {
        self.editor.type_text(input)?;
        Ok(self.sync_content().await)
    }

    pub async fn press_key(&mut self, key: Key) -> Result<bool, SurfaceError> {
        self.editor.press_key(key)?;
        Ok(self.sync_content().await)
    }

    /// New linked pages hang under this page, or under nothing while it is still unsaved.
    pub async fn select_menu_action(&mut self, action: MenuAction) -> Result<MenuOutcome, SurfaceError> {
        let parent = self.autosave.mode().await.id();
        let outcome = self
            .editor
            .select_menu_action(action, self.repo.as_ref(), parent)
            .await?;
        self.sync_content().await;
        Ok(outcome)
    }

    /// Replaces the whole surface with `content`, as a paste of the full document would.
    pub async fn replace_content(&mut self, content: &str) -> bool {
        self.editor = Editor::from_dialect(content);
        self.sync_content().await
    }

    /// Uploads an image and points the page's image or thumbnail at it.
    pub async fn attach_image(
        &self,
        uploader: &dyn ImageUploader,
        payload: &ImagePayload,
        slot: ImageSlot,
    ) -> Result<String, UploadError> {
        let url = uploader.upload(payload, slot.folder()).await?;
        let edit = match slot {
            ImageSlot::Image => FieldEdit::Image(Some(url.clone())),
            ImageSlot::Thumbnail => FieldEdit::Thumbnail(Some(url.clone())),
        };
        self.autosave.edit(edit).await;
        Ok(url)
    }

    // the surface is re-serialized after every input, as the content field
    async fn sync_content(&self) -> bool {
        self.autosave
            .edit(FieldEdit::Content(self.editor.to_dialect()))
            .await
    }

    /// Settles pending edits and stops autosave. Returns the final save state.
    pub async fn close(self) -> SaveState {
        self.autosave.flush().await;
        let state = self.autosave.state();
        self.autosave.shutdown().await;
        state
    }
}
