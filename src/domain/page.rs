use crate::domain::tags::{PageTag, TagInput};
use chrono::{DateTime, Utc};
use derive_more::derive::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub type PageId = i64;

/// Whether the page being edited exists server-side yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum RecordMode {
    #[display("new")]
    New,
    #[display("{_0}")]
    Existing(PageId),
}

impl RecordMode {
    pub fn id(&self) -> Option<PageId> {
        match self {
            RecordMode::New => None,
            RecordMode::Existing(id) => Some(*id),
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, RecordMode::New)
    }

    /// Client-side location of the studio for this record.
    pub fn studio_path(&self) -> String {
        format!("/studio/{}", self)
    }
}

impl FromStr for RecordMode {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim() == "new" {
            return Ok(RecordMode::New);
        }
        s.trim().parse::<PageId>().map(RecordMode::Existing)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Display)]
#[serde(rename_all = "camelCase")]
#[display("{} ({})", title, id)]
pub struct PageRecord {
    pub id: PageId,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub ai_desc: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub parent_id: Option<PageId>,
    #[serde(default)]
    pub order: Option<i64>,
    #[serde(default)]
    pub day: Option<i32>,
    #[serde(default)]
    pub month: Option<i32>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub hour: Option<i32>,
    #[serde(default)]
    pub minute: Option<i32>,
    #[serde(default)]
    pub tags: Vec<PageTag>,
    #[serde(default)]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl PageRecord {
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|tag| tag.name == name)
    }
}

/// Payload of a create call. Nullable fields go out as explicit `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInput {
    pub title: String,
    pub content: Option<String>,
    pub image: Option<String>,
    pub thumbnail: Option<String>,
    pub day: Option<i32>,
    pub month: Option<i32>,
    pub year: Option<i32>,
    pub hour: Option<i32>,
    pub minute: Option<i32>,
    pub tags: Vec<TagInput>,
    pub created_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<PageId>,
}

impl PageInput {
    pub fn titled(title: impl Into<String>, created_date: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            content: None,
            image: None,
            thumbnail: None,
            day: None,
            month: None,
            year: None,
            hour: None,
            minute: None,
            tags: Vec::new(),
            created_date,
            parent_id: None,
        }
    }
}

// outer None: field left untouched, Some(None): field cleared
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<Option<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<Option<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<Option<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hour: Option<Option<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minute: Option<Option<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<TagInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Option<PageId>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageFilter {
    pub parent_id: Option<PageId>,
    pub tag: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageFilter {
    pub fn with_limit(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Query pairs for the set parameters only.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(parent_id) = self.parent_id {
            pairs.push(("parentId", parent_id.to_string()));
        }
        if let Some(tag) = &self.tag {
            pairs.push(("tag", tag.clone()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageList {
    pub pages: Vec<PageRecord>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAck {
    pub message: String,
}
