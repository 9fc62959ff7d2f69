use crate::domain::{
    DeleteAck, PageFilter, PageId, PageInput, PageList, PageRecord, PageTag, PageUpdate,
};
use crate::error::{ApiError, RepositoryError, UploadError};
use crate::repository::PageRepository;
use crate::services::Navigator;
use crate::storage::{object_key, ImagePayload, ImageUploader};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// a bare page record with only the fields most tests care about
pub fn page(id: PageId, title: &str, content: Option<&str>) -> PageRecord {
    PageRecord {
        id,
        title: title.to_string(),
        content: content.map(str::to_string),
        ai_desc: None,
        image: None,
        thumbnail: None,
        parent_id: None,
        order: None,
        day: None,
        month: None,
        year: None,
        hour: None,
        minute: None,
        tags: Vec::new(),
        created_date: None,
        created_at: None,
        updated_at: None,
    }
}

pub fn tag(name: &str) -> PageTag {
    PageTag {
        id: None,
        name: name.to_string(),
        color: Some("#gray".to_string()),
    }
}

// every call the repository saw, in order
#[derive(Debug, Clone, PartialEq)]
pub enum RepoCall {
    List(PageFilter),
    Get(PageId),
    Create(PageInput),
    Update(PageId, PageUpdate),
    Delete(PageId),
}

// --- Manual Mock: PageRepository ---
// this fakes the REST API so logic tests never open a socket
// pages live in a HashMap, and failures can be switched on per page or for all writes
#[derive(Clone)]
pub struct MockRepository {
    pub pages: Arc<Mutex<HashMap<PageId, PageRecord>>>,
    pub calls: Arc<Mutex<Vec<RepoCall>>>,
    pub failing_gets: Arc<Mutex<HashSet<PageId>>>,
    pub fail_writes: Arc<Mutex<bool>>,
    pub write_delay: Arc<Mutex<Option<Duration>>>,
    pub next_id: Arc<Mutex<PageId>>,
}

impl MockRepository {
    pub fn new() -> Self {
        Self {
            pages: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            failing_gets: Arc::new(Mutex::new(HashSet::new())),
            fail_writes: Arc::new(Mutex::new(false)),
            write_delay: Arc::new(Mutex::new(None)),
            next_id: Arc::new(Mutex::new(1)),
        }
    }

    // helper to put a page in our fake server
    pub fn insert(&self, page: PageRecord) {
        self.pages.lock().unwrap().insert(page.id, page);
    }

    pub fn fail_get(&self, id: PageId) {
        self.failing_gets.lock().unwrap().insert(id);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap() = fail;
    }

    pub fn set_write_delay(&self, delay: Duration) {
        *self.write_delay.lock().unwrap() = Some(delay);
    }

    // the id the next create call hands out
    pub fn set_next_id(&self, id: PageId) {
        *self.next_id.lock().unwrap() = id;
    }

    pub fn calls(&self) -> Vec<RepoCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn creates(&self) -> Vec<PageInput> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RepoCall::Create(input) => Some(input),
                _ => None,
            })
            .collect()
    }

    pub fn updates(&self) -> Vec<(PageId, PageUpdate)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RepoCall::Update(id, update) => Some((id, update)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: RepoCall) {
        self.calls.lock().unwrap().push(call);
    }

    async fn before_write(&self) -> Result<(), RepositoryError> {
        let delay = *self.write_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if *self.fail_writes.lock().unwrap() {
            return Err(RepositoryError::Api(ApiError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "boom".to_string(),
            }));
        }
        Ok(())
    }
}

#[async_trait]
impl PageRepository for MockRepository {
    async fn list(&self, filter: &PageFilter) -> Result<PageList, RepositoryError> {
        self.record(RepoCall::List(filter.clone()));
        let pages: Vec<PageRecord> = self.pages.lock().unwrap().values().cloned().collect();
        Ok(PageList {
            total: pages.len() as u64,
            page: 1,
            limit: filter.limit.unwrap_or(10),
            total_pages: 1,
            pages,
        })
    }

    async fn get_by_id(&self, id: PageId) -> Result<PageRecord, RepositoryError> {
        self.record(RepoCall::Get(id));
        if self.failing_gets.lock().unwrap().contains(&id) {
            return Err(RepositoryError::Api(ApiError::Endpoint(format!("api/pages/{}", id))));
        }
        self.pages
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound(id))
    }

    async fn create(&self, input: &PageInput) -> Result<PageRecord, RepositoryError> {
        self.record(RepoCall::Create(input.clone()));
        self.before_write().await?;

        let id = {
            let mut next_id = self.next_id.lock().unwrap();
            let id = *next_id;
            *next_id += 1;
            id
        };
        let mut created = page(id, &input.title, input.content.as_deref());
        created.parent_id = input.parent_id;
        created.image = input.image.clone();
        created.created_date = Some(input.created_date);
        self.insert(created.clone());
        Ok(created)
    }

    async fn update(&self, id: PageId, update: &PageUpdate) -> Result<PageRecord, RepositoryError> {
        self.record(RepoCall::Update(id, update.clone()));
        self.before_write().await?;

        let mut pages = self.pages.lock().unwrap();
        let existing = pages.get_mut(&id).ok_or(RepositoryError::NotFound(id))?;
        if let Some(title) = &update.title {
            existing.title = title.clone();
        }
        if let Some(content) = &update.content {
            existing.content = content.clone();
        }
        Ok(existing.clone())
    }

    async fn delete(&self, id: PageId) -> Result<DeleteAck, RepositoryError> {
        self.record(RepoCall::Delete(id));
        self.pages
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| DeleteAck {
                message: "Page deleted".to_string(),
            })
            .ok_or(RepositoryError::NotFound(id))
    }
}

// --- Manual Mock: Navigator ---
// just remembers every location the coordinator asked for
#[derive(Clone)]
pub struct RecordingNavigator {
    pub locations: Arc<Mutex<Vec<String>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self {
            locations: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn locations(&self) -> Vec<String> {
        self.locations.lock().unwrap().clone()
    }
}

#[async_trait]
impl Navigator for RecordingNavigator {
    async fn replace_location(&self, path: &str) -> Result<()> {
        self.locations.lock().unwrap().push(path.to_string());
        Ok(())
    }
}

// --- Manual Mock: ImageUploader ---
// validates like the real uploader, then hands back a fake public URL
#[derive(Clone)]
pub struct MockUploader {
    pub uploaded: Arc<Mutex<Vec<String>>>,
}

impl MockUploader {
    pub fn new() -> Self {
        Self {
            uploaded: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl ImageUploader for MockUploader {
    async fn upload(&self, payload: &ImagePayload, folder: &str) -> Result<String, UploadError> {
        payload.validate()?;
        let key = object_key(folder, &payload.file_name, 0);
        self.uploaded.lock().unwrap().push(key.clone());
        Ok(format!("https://cdn.test/photonslib/{}", key))
    }
}
