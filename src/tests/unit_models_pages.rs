use crate::api::{ApiClient, ApiErrorBody};
use crate::domain::{PageFilter, PageInput, PageList, PageRecord, PageUpdate, RecordMode, TagSet};
use crate::error::{ApiError, RepositoryError};
use crate::services::autosave::{EditFields, FieldEdit};
use chrono::{TimeZone, Utc};
use reqwest::StatusCode;
use serde_json::json;
use std::time::Duration;

// test that a server page in camelCase deserializes, with missing fields defaulted
#[test]
fn test_page_record_deserializes_camel_case() {
    let raw = json!({
        "id": 12,
        "title": "Viagem",
        "content": "# Dia 1",
        "aiDesc": "uma praia",
        "parentId": 3,
        "tags": [{ "id": 1, "name": "collection", "color": "#gray" }],
        "createdAt": "2024-01-02T03:04:05Z"
    });

    let page: PageRecord = serde_json::from_value(raw).unwrap();

    assert_eq!(page.id, 12);
    assert_eq!(page.ai_desc.as_deref(), Some("uma praia"));
    assert_eq!(page.parent_id, Some(3));
    assert!(page.has_tag("collection"));
    assert_eq!(page.image, None);
    assert_eq!(page.year, None);
    assert_eq!(page.created_at, Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).single());
    assert_eq!(page.to_string(), "Viagem (12)");
}

#[test]
fn test_page_list_deserializes() {
    let raw = json!({
        "pages": [{ "id": 1, "title": "Um" }],
        "total": 1,
        "page": 1,
        "limit": 500,
        "totalPages": 1
    });

    let list: PageList = serde_json::from_value(raw).unwrap();
    assert_eq!(list.pages.len(), 1);
    assert_eq!(list.total_pages, 1);
}

// create sends every nullable field as an explicit null, and leaves parentId out when unset
#[test]
fn test_page_input_serializes_nulls() {
    let date = Utc.with_ymd_and_hms(2024, 5, 6, 0, 0, 0).unwrap();
    let input = PageInput::titled("Draft", date);

    let value = serde_json::to_value(&input).unwrap();

    assert_eq!(value["title"], "Draft");
    assert!(value["content"].is_null());
    assert!(value.as_object().unwrap().contains_key("thumbnail"));
    assert!(!value.as_object().unwrap().contains_key("parentId"));
    assert_eq!(value["createdDate"], "2024-05-06T00:00:00Z");
    assert_eq!(value["tags"], json!([]));
}

// update distinguishes "leave alone" from "clear"
#[test]
fn test_page_update_null_semantics() {
    let update = PageUpdate {
        title: Some("Novo".to_string()),
        image: Some(None),
        year: Some(Some(2020)),
        ..PageUpdate::default()
    };

    let value = serde_json::to_value(&update).unwrap();
    let object = value.as_object().unwrap();

    assert_eq!(object.len(), 3);
    assert_eq!(value["title"], "Novo");
    assert!(value["image"].is_null());
    assert_eq!(value["year"], 2020);
    assert!(!object.contains_key("content"));
}

// the autosave update always carries every watched field
#[test]
fn test_edit_fields_to_update_sends_everything() {
    let mut fields = EditFields::titled("A");
    fields.apply(FieldEdit::AddTag("viagem".to_string()));

    let value = serde_json::to_value(fields.to_update()).unwrap();
    let object = value.as_object().unwrap();

    for key in ["title", "content", "image", "thumbnail", "day", "month", "year", "hour", "minute", "tags"] {
        assert!(object.contains_key(key), "missing {}", key);
    }
    assert!(!object.contains_key("parentId"));
    // empty content clears the field rather than storing ""
    assert!(value["content"].is_null());
    assert_eq!(value["tags"], json!([{ "name": "viagem", "color": "#gray" }]));
}

#[test]
fn test_filter_query_pairs() {
    let filter = PageFilter {
        parent_id: Some(4),
        search: Some("sol".to_string()),
        limit: Some(500),
        ..PageFilter::default()
    };

    assert_eq!(
        filter.query_pairs(),
        vec![
            ("limit", "500".to_string()),
            ("parentId", "4".to_string()),
            ("search", "sol".to_string()),
        ]
    );
    assert!(PageFilter::default().query_pairs().is_empty());
}

#[test]
fn test_record_mode_parsing_and_paths() {
    assert_eq!("new".parse::<RecordMode>(), Ok(RecordMode::New));
    assert_eq!(" 42 ".parse::<RecordMode>(), Ok(RecordMode::Existing(42)));
    assert!("abc".parse::<RecordMode>().is_err());

    assert_eq!(RecordMode::New.studio_path(), "/studio/new");
    assert_eq!(RecordMode::Existing(42).studio_path(), "/studio/42");
    assert_eq!(RecordMode::Existing(42).id(), Some(42));
    assert!(RecordMode::New.is_new());
}

// tag sets refuse blanks and duplicates
#[test]
fn test_tag_set_uniqueness() {
    let mut tags = TagSet::new();
    assert!(tags.add("viagem"));
    assert!(!tags.add(" viagem "));
    assert!(!tags.add("  "));
    assert!(tags.add("praia"));
    assert_eq!(tags.len(), 2);

    assert!(tags.remove("viagem"));
    assert!(!tags.remove("viagem"));
    assert!(!tags.contains("viagem"));
}

// server error bodies prefer the message, then the error, then a generic text
#[test]
fn test_error_body_message() {
    let both = ApiErrorBody {
        error: Some("Bad Request".to_string()),
        message: Some("title is required".to_string()),
    };
    assert_eq!(both.into_message(), "title is required");

    let only_error = ApiErrorBody {
        error: Some("Forbidden".to_string()),
        message: Some(String::new()),
    };
    assert_eq!(only_error.into_message(), "Forbidden");

    assert_eq!(ApiErrorBody::default().into_message(), "API request failed");
}

// a 404 on a page call becomes NotFound, a 401 anywhere becomes Unauthorized
#[test]
fn test_repository_error_mapping() {
    let status = |code: StatusCode| ApiError::Status {
        status: code,
        message: "x".to_string(),
    };

    assert!(matches!(
        RepositoryError::from_api(status(StatusCode::NOT_FOUND), Some(9)),
        RepositoryError::NotFound(9)
    ));
    assert!(matches!(
        RepositoryError::from_api(status(StatusCode::UNAUTHORIZED), None),
        RepositoryError::Unauthorized
    ));
    assert!(matches!(
        RepositoryError::from(status(StatusCode::NOT_FOUND)),
        RepositoryError::Api(_)
    ));
}

#[test]
fn test_api_endpoints_join_under_base_path() {
    let api = ApiClient::new("http://localhost:3000/v1", Duration::from_secs(5)).unwrap();

    assert_eq!(
        api.endpoint("/api/pages/3").unwrap().as_str(),
        "http://localhost:3000/v1/api/pages/3"
    );
}
