use crate::domain::{DeleteAck, PageFilter, PageId, PageInput, PageList, PageRecord, PageUpdate};
use crate::error::RepositoryError;
use async_trait::async_trait;

pub mod http;

pub use http::HttpPageRepository;

// the repository is shared between the editor, the autosave worker and link resolution,
// so implementations must be usable behind an Arc from any task
#[async_trait]
pub trait PageRepository: Send + Sync {
    async fn list(&self, filter: &PageFilter) -> Result<PageList, RepositoryError>;
    async fn get_by_id(&self, id: PageId) -> Result<PageRecord, RepositoryError>;

    // write operations
    async fn create(&self, input: &PageInput) -> Result<PageRecord, RepositoryError>;
    async fn update(&self, id: PageId, input: &PageUpdate) -> Result<PageRecord, RepositoryError>;
    async fn delete(&self, id: PageId) -> Result<DeleteAck, RepositoryError>;
}
