use crate::domain::{DeleteAck, PageFilter, PageId, PageInput, PageList, PageRecord, PageUpdate};
use crate::error::RepositoryError;
use crate::repository::PageRepository;
use crate::session::Session;
use async_trait::async_trait;
use reqwest::{Method, Url};
use std::sync::Arc;
use tracing::debug;

pub struct HttpPageRepository {
    session: Arc<Session>,
}

impl HttpPageRepository {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    fn page_url(&self, id: PageId) -> Result<Url, RepositoryError> {
        Ok(self.session.api().endpoint(&format!("api/pages/{}", id))?)
    }

    async fn call<T, B>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        id: Option<PageId>,
    ) -> Result<T, RepositoryError>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized + Sync,
    {
        let api = self.session.api();
        let token = self.session.token().await;

        debug!(%method, %url, "page repository request");

        let mut builder = api.request(method, url, token.as_deref());
        if let Some(body) = body {
            builder = builder.json(body);
        }

        api.send_json(builder)
            .await
            .map_err(|e| RepositoryError::from_api(e, id))
    }
}

#[async_trait]
impl PageRepository for HttpPageRepository {
    async fn list(&self, filter: &PageFilter) -> Result<PageList, RepositoryError> {
        let mut url = self.session.api().endpoint("api/pages")?;
        let pairs = filter.query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        self.call::<PageList, ()>(Method::GET, url, None, None).await
    }

    async fn get_by_id(&self, id: PageId) -> Result<PageRecord, RepositoryError> {
        let url = self.page_url(id)?;
        self.call::<PageRecord, ()>(Method::GET, url, None, Some(id)).await
    }

    async fn create(&self, input: &PageInput) -> Result<PageRecord, RepositoryError> {
        let url = self.session.api().endpoint("api/pages")?;
        self.call(Method::POST, url, Some(input), None).await
    }

    async fn update(&self, id: PageId, input: &PageUpdate) -> Result<PageRecord, RepositoryError> {
        let url = self.page_url(id)?;
        self.call(Method::PUT, url, Some(input), Some(id)).await
    }

    async fn delete(&self, id: PageId) -> Result<DeleteAck, RepositoryError> {
        let url = self.page_url(id)?;
        self.call::<DeleteAck, ()>(Method::DELETE, url, None, Some(id)).await
    }
}
