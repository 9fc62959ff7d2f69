use crate::domain::{PageFilter, PageId, PageRecord};
use crate::error::RepositoryError;
use crate::repository::PageRepository;
use crate::session::AuthenticatedUser;
use chrono::{DateTime, Utc};
use derive_more::derive::Display;
use std::str::FromStr;
use tracing::info;

pub const FETCH_LIMIT: u32 = 500;
pub const COLLECTION_TAG: &str = "collection";
pub const CALLOUT_TAG: &str = "callout";
pub const NO_DATE_LABEL: &str = "Sem data";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
pub enum LibraryTab {
    #[default]
    #[display("collections")]
    Collections,
    #[display("library")]
    Library,
    #[display("gallery")]
    Gallery,
}

impl LibraryTab {
    pub const ALL: [LibraryTab; 3] = [LibraryTab::Collections, LibraryTab::Library, LibraryTab::Gallery];

    pub fn label(&self) -> &'static str {
        match self {
            LibraryTab::Collections => "Coleções",
            LibraryTab::Library => "Biblioteca",
            LibraryTab::Gallery => "Galeria",
        }
    }

    pub fn matches(&self, page: &PageRecord) -> bool {
        match self {
            LibraryTab::Collections => page.has_tag(COLLECTION_TAG),
            LibraryTab::Library => true,
            LibraryTab::Gallery => page.image.as_deref().is_some_and(|url| !url.is_empty()),
        }
    }
}

impl FromStr for LibraryTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LibraryTab::ALL
            .into_iter()
            .find(|tab| tab.to_string() == s)
            .ok_or_else(|| format!("unknown tab '{}' (expected collections, library or gallery)", s))
    }
}

/// Tab and search state of the home listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryView {
    tab: LibraryTab,
    search: String,
}

impl LibraryView {
    pub fn new(tab: LibraryTab) -> Self {
        Self {
            tab,
            search: String::new(),
        }
    }

    pub fn tab(&self) -> LibraryTab {
        self.tab
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_tab(&mut self, tab: LibraryTab) {
        self.tab = tab;
    }

    // searching always happens across the whole library
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
        if !self.search.trim().is_empty() {
            self.tab = LibraryTab::Library;
        }
    }

    /// Pages of the active tab matching the search, newest custom date first.
    pub fn visible(&self, pages: &[PageRecord]) -> Vec<PageRecord> {
        let query = self.search.trim().to_lowercase();

        let mut visible: Vec<PageRecord> = pages
            .iter()
            .filter(|page| self.tab.matches(page))
            .filter(|page| query.is_empty() || haystack(page).contains(&query))
            .cloned()
            .collect();

        visible.sort_by_key(|page| std::cmp::Reverse(date_key(page)));

        if self.tab == LibraryTab::Collections {
            // stable, so the date order survives within each group
            visible.sort_by_key(|page| !page.has_tag(CALLOUT_TAG));
        }
        visible
    }

    /// Keeps the previous selection while it is still visible, otherwise picks a default.
    pub fn default_selection<'a>(
        &self,
        visible: &'a [PageRecord],
        previous: Option<PageId>,
    ) -> Option<&'a PageRecord> {
        if let Some(page) = previous.and_then(|id| visible.iter().find(|page| page.id == id)) {
            return Some(page);
        }

        if self.tab == LibraryTab::Collections {
            if let Some(callout) = visible.iter().find(|page| page.has_tag(CALLOUT_TAG)) {
                return Some(callout);
            }
        }
        visible.first()
    }
}

fn haystack(page: &PageRecord) -> String {
    format!(
        "{} {} {}",
        page.title,
        page.ai_desc.as_deref().unwrap_or(""),
        page.content.as_deref().unwrap_or("")
    )
    .to_lowercase()
}

fn date_key(page: &PageRecord) -> (i32, i32, i32, i32, i32) {
    (
        page.year.unwrap_or(0),
        page.month.unwrap_or(0),
        page.day.unwrap_or(0),
        page.hour.unwrap_or(0),
        page.minute.unwrap_or(0),
    )
}

/// `dd/mm/yyyy hh:mm` from whichever custom components are set, falling back to the
/// creation dates.
pub fn custom_date_label(page: &PageRecord) -> String {
    let date: Vec<String> = [
        page.day.map(|d| format!("{:02}", d)),
        page.month.map(|m| format!("{:02}", m)),
        page.year.map(|y| y.to_string()),
    ]
    .into_iter()
    .flatten()
    .collect();

    let time: Vec<String> = [page.hour, page.minute]
        .into_iter()
        .flatten()
        .map(|v| format!("{:02}", v))
        .collect();

    let parts: Vec<String> = [date.join("/"), time.join(":")]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect();

    if !parts.is_empty() {
        return parts.join(" ");
    }

    page.created_date
        .or(page.created_at)
        .map(short_date)
        .unwrap_or_else(|| NO_DATE_LABEL.to_string())
}

fn short_date(date: DateTime<Utc>) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Only admins may delete pages.
pub fn can_delete(user: Option<&AuthenticatedUser>) -> bool {
    user.is_some_and(AuthenticatedUser::is_admin)
}

pub async fn fetch_library(repo: &dyn PageRepository) -> Result<Vec<PageRecord>, RepositoryError> {
    let list = repo.list(&PageFilter::with_limit(FETCH_LIMIT)).await?;
    info!(count = list.pages.len(), total = list.total, "Loaded library");
    Ok(list.pages)
}
