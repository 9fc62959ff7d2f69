use crate::domain::{PageId, PageInput, PageRecord, PageUpdate, TagSet};
use chrono::{DateTime, Utc};

/// The watched fields of a page in the studio. Local copy is authoritative while editing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditFields {
    pub title: String,
    pub content: String,
    pub image: Option<String>,
    pub thumbnail: Option<String>,
    pub day: Option<i32>,
    pub month: Option<i32>,
    pub year: Option<i32>,
    pub hour: Option<i32>,
    pub minute: Option<i32>,
    pub tags: TagSet,
}

/// One user edit. Setting a URL to an empty string clears it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    Title(String),
    Content(String),
    Image(Option<String>),
    Thumbnail(Option<String>),
    Day(Option<i32>),
    Month(Option<i32>),
    Year(Option<i32>),
    Hour(Option<i32>),
    Minute(Option<i32>),
    AddTag(String),
    RemoveTag(String),
    Tags(TagSet),
}

impl EditFields {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn from_record(record: &PageRecord) -> Self {
        Self {
            title: record.title.clone(),
            content: record.content.clone().unwrap_or_default(),
            image: non_empty(record.image.clone()),
            thumbnail: non_empty(record.thumbnail.clone()),
            day: record.day,
            month: record.month,
            year: record.year,
            hour: record.hour,
            minute: record.minute,
            tags: TagSet::from(record.tags.as_slice()),
        }
    }

    /// Applies an edit, returning whether any value actually changed.
    pub fn apply(&mut self, edit: FieldEdit) -> bool {
        let before = self.clone();
        match edit {
            FieldEdit::Title(title) => self.title = title,
            FieldEdit::Content(content) => self.content = content,
            FieldEdit::Image(url) => self.image = non_empty(url),
            FieldEdit::Thumbnail(url) => self.thumbnail = non_empty(url),
            FieldEdit::Day(v) => self.day = v,
            FieldEdit::Month(v) => self.month = v,
            FieldEdit::Year(v) => self.year = v,
            FieldEdit::Hour(v) => self.hour = v,
            FieldEdit::Minute(v) => self.minute = v,
            FieldEdit::AddTag(name) => {
                self.tags.add(&name);
            }
            FieldEdit::RemoveTag(name) => {
                self.tags.remove(&name);
            }
            FieldEdit::Tags(tags) => self.tags = tags,
        }
        *self != before
    }

    pub fn to_create_input(&self, created_date: DateTime<Utc>, parent_id: Option<PageId>) -> PageInput {
        PageInput {
            title: self.title.clone(),
            content: non_empty(Some(self.content.clone())),
            image: self.image.clone(),
            thumbnail: self.thumbnail.clone(),
            day: self.day,
            month: self.month,
            year: self.year,
            hour: self.hour,
            minute: self.minute,
            tags: self.tags.to_inputs(),
            created_date,
            parent_id,
        }
    }

    /// Every watched field goes out, so the server ends up matching the local copy.
    pub fn to_update(&self) -> PageUpdate {
        PageUpdate {
            title: Some(self.title.clone()),
            content: Some(non_empty(Some(self.content.clone()))),
            image: Some(self.image.clone()),
            thumbnail: Some(self.thumbnail.clone()),
            day: Some(self.day),
            month: Some(self.month),
            year: Some(self.year),
            hour: Some(self.hour),
            minute: Some(self.minute),
            tags: Some(self.tags.to_inputs()),
            parent_id: None,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
