use crate::domain::RecordMode;
use crate::services::autosave::fields::EditFields;

/// Decides whether settled edits warrant a persistence call.
///
/// A blank title never saves. A new record saves once it has a title or content; an
/// existing one saves when any field differs from the last-known-persisted snapshot.
/// Without a snapshot (the record never finished loading) there is nothing to diff
/// against, so nothing is saved.
pub fn should_save(mode: RecordMode, settled: &EditFields, persisted: Option<&EditFields>) -> bool {
    if settled.title.trim().is_empty() {
        return false;
    }

    match mode {
        RecordMode::New => !settled.title.is_empty() || !settled.content.is_empty(),
        RecordMode::Existing(_) => persisted.is_some_and(|snapshot| snapshot != settled),
    }
}
