use serde::{Deserialize, Serialize};

pub const DEFAULT_TAG_COLOR: &str = "#gray";

/// A tag as the server returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageTag {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TagInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl From<&PageTag> for TagInput {
    fn from(tag: &PageTag) -> Self {
        Self {
            name: tag.name.clone(),
            color: tag.color.clone(),
        }
    }
}

/// Tags attached to a page being edited. Names are unique; equality ignores order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(Vec<TagInput>);

impl TagSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Adds a tag with the default color. Returns false for empty or duplicate names.
    pub fn add(&mut self, name: &str) -> bool {
        self.add_with_color(name, DEFAULT_TAG_COLOR)
    }

    pub fn add_with_color(&mut self, name: &str, color: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.contains(name) {
            return false;
        }
        self.0.push(TagInput {
            name: name.to_string(),
            color: Some(color.to_string()),
        });
        true
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|tag| tag.name != name);
        self.0.len() != before
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|tag| tag.name == name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TagInput> {
        self.0.iter()
    }

    pub fn to_inputs(&self) -> Vec<TagInput> {
        self.0.clone()
    }

    fn sorted(&self) -> Vec<&TagInput> {
        let mut tags: Vec<&TagInput> = self.0.iter().collect();
        tags.sort();
        tags
    }
}

impl PartialEq for TagSet {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len() && self.sorted() == other.sorted()
    }
}

impl Eq for TagSet {}

impl From<&[PageTag]> for TagSet {
    // later duplicates are dropped so the set invariant holds for any server payload
    fn from(tags: &[PageTag]) -> Self {
        let mut set = TagSet::new();
        for tag in tags {
            if !set.contains(&tag.name) {
                set.0.push(TagInput::from(tag));
            }
        }
        set
    }
}

impl FromIterator<TagInput> for TagSet {
    fn from_iter<I: IntoIterator<Item = TagInput>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for tag in iter {
            if !set.contains(&tag.name) {
                set.0.push(tag);
            }
        }
        set
    }
}
