use crate::domain::PageRecord;
use crate::features::library::{can_delete, fetch_library, FETCH_LIMIT};
use crate::features::{custom_date_label, LibraryTab, LibraryView};
use crate::session::AuthenticatedUser;
use crate::tests::support::{page, tag, MockRepository, RepoCall};
use chrono::{TimeZone, Utc};

fn dated(id: i64, title: &str, year: i32, month: i32, day: i32) -> PageRecord {
    let mut record = page(id, title, None);
    record.year = Some(year);
    record.month = Some(month);
    record.day = Some(day);
    record
}

fn tagged(mut record: PageRecord, names: &[&str]) -> PageRecord {
    record.tags = names.iter().map(|name| tag(name)).collect();
    record
}

fn ids(pages: &[PageRecord]) -> Vec<i64> {
    pages.iter().map(|page| page.id).collect()
}

fn sample() -> Vec<PageRecord> {
    let mut with_image = dated(3, "Praia", 2021, 1, 1);
    with_image.image = Some("https://cdn/praia.png".to_string());
    let mut empty_image = dated(4, "Sem foto", 2022, 1, 1);
    empty_image.image = Some(String::new());

    vec![
        tagged(dated(1, "Coleção antiga", 2019, 5, 1), &["collection"]),
        tagged(dated(2, "Destaque", 2018, 1, 1), &["collection", "callout"]),
        with_image,
        empty_image,
        tagged(dated(5, "Coleção nova", 2023, 2, 1), &["collection"]),
    ]
}

// test that each tab keeps only its own pages
#[test]
fn test_tabs_filter_pages() {
    let pages = sample();

    let library = LibraryView::new(LibraryTab::Library).visible(&pages);
    assert_eq!(library.len(), 5);

    let gallery = LibraryView::new(LibraryTab::Gallery).visible(&pages);
    assert_eq!(ids(&gallery), vec![3]);

    let collections = LibraryView::new(LibraryTab::Collections).visible(&pages);
    assert_eq!(collections.len(), 3);
}

// newest custom date first
#[test]
fn test_library_sorted_by_custom_date() {
    let view = LibraryView::new(LibraryTab::Library);
    assert_eq!(ids(&view.visible(&sample())), vec![5, 4, 3, 1, 2]);
}

// callouts lead the collections tab, the rest keep date order
#[test]
fn test_callouts_come_first_in_collections() {
    let view = LibraryView::new(LibraryTab::Collections);
    assert_eq!(ids(&view.visible(&sample())), vec![2, 5, 1]);
}

// typing a search term jumps to the full library
#[test]
fn test_search_switches_to_library() {
    let mut view = LibraryView::default();
    assert_eq!(view.tab(), LibraryTab::Collections);

    view.set_search("   ");
    assert_eq!(view.tab(), LibraryTab::Collections);

    view.set_search("PRAIA");
    assert_eq!(view.tab(), LibraryTab::Library);
    assert_eq!(ids(&view.visible(&sample())), vec![3]);
}

// search looks at the title, the ai description and the content
#[test]
fn test_search_matches_description_and_content() {
    let mut described = page(1, "Sem pista", None);
    described.ai_desc = Some("Um pôr do sol laranja".to_string());
    let written = page(2, "Diário", Some("hoje vi o SOL nascer"));
    let other = page(3, "Nada", Some("chuva"));
    let pages = vec![described, written, other];

    let mut view = LibraryView::default();
    view.set_search("sol");
    let mut found = ids(&view.visible(&pages));
    found.sort();
    assert_eq!(found, vec![1, 2]);
}

// the previous selection survives while visible, otherwise the callout or the first page wins
#[test]
fn test_default_selection() {
    let collections = LibraryView::new(LibraryTab::Collections);
    let visible = collections.visible(&sample());

    assert_eq!(collections.default_selection(&visible, Some(5)).map(|p| p.id), Some(5));
    assert_eq!(collections.default_selection(&visible, Some(3)).map(|p| p.id), Some(2));
    assert_eq!(collections.default_selection(&visible, None).map(|p| p.id), Some(2));

    let library = LibraryView::new(LibraryTab::Library);
    let visible = library.visible(&sample());
    assert_eq!(library.default_selection(&visible, None).map(|p| p.id), Some(5));
    assert!(library.default_selection(&[], None).is_none());
}

#[test]
fn test_tab_names() {
    assert_eq!("gallery".parse::<LibraryTab>(), Ok(LibraryTab::Gallery));
    assert!("fotos".parse::<LibraryTab>().is_err());
    assert_eq!(LibraryTab::Collections.to_string(), "collections");
    assert_eq!(LibraryTab::Library.label(), "Biblioteca");
}

// the label uses whichever custom components are set and falls back to creation dates
#[test]
fn test_custom_date_label() {
    let mut full = dated(1, "x", 2024, 3, 7);
    full.hour = Some(9);
    full.minute = Some(5);
    assert_eq!(custom_date_label(&full), "07/03/2024 09:05");

    let mut year_only = page(2, "x", None);
    year_only.year = Some(1999);
    assert_eq!(custom_date_label(&year_only), "1999");

    let mut created = page(3, "x", None);
    created.created_at = Utc.with_ymd_and_hms(2020, 12, 25, 10, 0, 0).single();
    assert_eq!(custom_date_label(&created), "25/12/2020");

    assert_eq!(custom_date_label(&page(4, "x", None)), "Sem data");
}

#[test]
fn test_only_admins_can_delete() {
    let user = |role: Option<&str>| AuthenticatedUser {
        id: "u1".to_string(),
        email: "a@b.c".to_string(),
        full_name: "Ana".to_string(),
        role: role.map(str::to_string),
    };

    assert!(can_delete(Some(&user(Some("ADMIN")))));
    assert!(!can_delete(Some(&user(Some("CONSULTANT")))));
    assert!(!can_delete(Some(&user(None))));
    assert!(!can_delete(None));
}

#[tokio::test]
async fn test_fetch_library_asks_for_everything() {
    let repo = MockRepository::new();
    repo.insert(page(1, "Um", None));

    let pages = fetch_library(&repo).await.unwrap();

    assert_eq!(pages.len(), 1);
    match &repo.calls()[0] {
        RepoCall::List(filter) => assert_eq!(filter.limit, Some(FETCH_LIMIT)),
        other => panic!("expected a list call, got {:?}", other),
    }
}
