use crate::config::FotonsConfig;
use crate::domain::{PageId, PageRecord, RecordMode};
use crate::repository::PageRepository;
use crate::services::autosave::fields::{EditFields, FieldEdit};
use crate::services::autosave::predicate::should_save;
use crate::services::autosave::worker::{run_autosave_worker, AutosaveCommand};
use crate::services::Navigator;
use chrono::{DateTime, Utc};
use derive_more::derive::Display;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

const COMMAND_BUFFER: usize = 100;

/// What happens after a failed save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
pub enum RetryPolicy {
    /// Nothing is scheduled; the next edit that qualifies re-arms the debounce.
    #[default]
    #[display("on-next-qualifying-change")]
    OnNextQualifyingChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosaveConfig {
    pub debounce: Duration,
    pub retry: RetryPolicy,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(crate::config::DEFAULT_DEBOUNCE_MS),
            retry: RetryPolicy::default(),
        }
    }
}

impl From<&FotonsConfig> for AutosaveConfig {
    fn from(config: &FotonsConfig) -> Self {
        Self {
            debounce: config.autosave_debounce,
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SaveStatus {
    #[display("idle")]
    Idle,
    #[display("dirty")]
    Dirty,
    #[display("saving")]
    Saving,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaveState {
    pub status: SaveStatus,
    pub last_saved: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl Default for SaveState {
    fn default() -> Self {
        Self {
            status: SaveStatus::Idle,
            last_saved: None,
            last_error: None,
        }
    }
}

struct EditSession {
    mode: RecordMode,
    fields: EditFields,
    // last-known-persisted values; advanced to what was sent, never to a server reply
    persisted: Option<EditFields>,
    parent_id: Option<PageId>,
}

pub(crate) struct AutosaveCore {
    repo: Arc<dyn PageRepository>,
    navigator: Arc<dyn Navigator>,
    retry: RetryPolicy,
    session: RwLock<EditSession>,
    state: watch::Sender<SaveState>,
    pending: AtomicBool,
    evaluations: AtomicU64,
}

impl AutosaveCore {
    pub(crate) fn take_pending(&self) -> bool {
        self.pending.swap(false, Ordering::SeqCst)
    }

    /// Evaluates the settled fields and saves when they qualify. Returns whether a save
    /// went through.
    pub(crate) async fn settle(&self) -> bool {
        let (mode, settled, parent_id, qualifies) = {
            let session = self.session.read().await;
            let settled = session.fields.clone();
            let qualifies = should_save(session.mode, &settled, session.persisted.as_ref());
            (session.mode, settled, session.parent_id, qualifies)
        };
        self.evaluations.fetch_add(1, Ordering::SeqCst);
        debug!(mode = %mode, qualifies, "Evaluated settled edits");

        if !qualifies {
            self.state.send_modify(|state| {
                if state.status == SaveStatus::Dirty {
                    state.status = SaveStatus::Idle;
                }
            });
            return false;
        }

        self.save(mode, settled, parent_id).await
    }

    async fn save(&self, mode: RecordMode, sent: EditFields, parent_id: Option<PageId>) -> bool {
        self.state.send_modify(|state| state.status = SaveStatus::Saving);

        let outcome = match mode {
            RecordMode::New => {
                let input = sent.to_create_input(Utc::now(), parent_id);
                self.repo.create(&input).await.map(|page| Some(page.id))
            }
            RecordMode::Existing(id) => self.repo.update(id, &sent.to_update()).await.map(|_| None),
        };

        match outcome {
            Ok(created) => {
                let saved_at = Utc::now();
                let (mode, still_dirty) = {
                    let mut session = self.session.write().await;
                    if let Some(id) = created {
                        session.mode = RecordMode::Existing(id);
                    }
                    let still_dirty = session.fields != sent;
                    session.persisted = Some(sent);
                    (session.mode, still_dirty)
                };

                if created.is_some() {
                    info!(page_id = %mode, "Created page");
                    if let Err(e) = self.navigator.replace_location(&mode.studio_path()).await {
                        warn!(error = %e, "Failed to update location after create");
                    }
                } else {
                    info!(page_id = %mode, "Saved page");
                }

                self.state.send_modify(|state| {
                    state.status = if still_dirty {
                        SaveStatus::Dirty
                    } else {
                        SaveStatus::Idle
                    };
                    state.last_saved = Some(saved_at);
                    state.last_error = None;
                });
                true
            }
            Err(e) => {
                error!(page_id = %mode, error = %e, "Failed to save page");
                match self.retry {
                    RetryPolicy::OnNextQualifyingChange => {
                        debug!("No retry scheduled; waiting for the next edit")
                    }
                }
                self.state.send_modify(|state| {
                    state.status = SaveStatus::Idle;
                    state.last_error = Some(e.to_string());
                });
                false
            }
        }
    }
}

/// Debounced, eventually-consistent persistence of one studio editing session.
///
/// Edits go through [`AutosaveCoordinator::edit`]; a background worker waits for a quiet
/// period, runs the should-save predicate and issues the create or update call.
pub struct AutosaveCoordinator {
    core: Arc<AutosaveCore>,
    sender: mpsc::Sender<AutosaveCommand>,
    worker: JoinHandle<()>,
}

impl AutosaveCoordinator {
    /// A page that exists only locally. `parent_id` is sent with the create call.
    pub fn start_new(
        repo: Arc<dyn PageRepository>,
        navigator: Arc<dyn Navigator>,
        config: AutosaveConfig,
        fields: EditFields,
        parent_id: Option<PageId>,
    ) -> Self {
        let session = EditSession {
            mode: RecordMode::New,
            fields,
            persisted: None,
            parent_id,
        };
        Self::start(repo, navigator, config, session)
    }

    /// A page loaded from the repository; the loaded values are the persisted snapshot.
    pub fn start_existing(
        repo: Arc<dyn PageRepository>,
        navigator: Arc<dyn Navigator>,
        config: AutosaveConfig,
        record: &PageRecord,
    ) -> Self {
        let fields = EditFields::from_record(record);
        let session = EditSession {
            mode: RecordMode::Existing(record.id),
            persisted: Some(fields.clone()),
            fields,
            parent_id: record.parent_id,
        };
        Self::start(repo, navigator, config, session)
    }

    fn start(
        repo: Arc<dyn PageRepository>,
        navigator: Arc<dyn Navigator>,
        config: AutosaveConfig,
        session: EditSession,
    ) -> Self {
        let core = Arc::new(AutosaveCore {
            repo,
            navigator,
            retry: config.retry,
            session: RwLock::new(session),
            state: watch::Sender::new(SaveState::default()),
            pending: AtomicBool::new(false),
            evaluations: AtomicU64::new(0),
        });

        let (tx, rx) = mpsc::channel::<AutosaveCommand>(COMMAND_BUFFER);
        let worker = tokio::spawn(run_autosave_worker(core.clone(), rx, config.debounce));

        Self {
            core,
            sender: tx,
            worker,
        }
    }

    /// Applies an edit to the local copy and re-arms the debounce. Returns whether the
    /// value changed; no-op edits do not re-arm anything.
    pub async fn edit(&self, edit: FieldEdit) -> bool {
        let changed = self.core.session.write().await.fields.apply(edit);
        if changed {
            self.mark_changed();
        }
        changed
    }

    pub async fn edit_all(&self, edits: impl IntoIterator<Item = FieldEdit>) -> bool {
        let changed = {
            let mut session = self.core.session.write().await;
            edits
                .into_iter()
                .fold(false, |changed, edit| session.fields.apply(edit) | changed)
        };
        if changed {
            self.mark_changed();
        }
        changed
    }

    fn mark_changed(&self) {
        self.core.pending.store(true, Ordering::SeqCst);
        self.core.state.send_modify(|state| {
            if state.status == SaveStatus::Idle {
                state.status = SaveStatus::Dirty;
            }
        });

        match self.sender.try_send(AutosaveCommand::Changed) {
            Ok(()) => {}
            // a queued command already guarantees another pass over the pending flag
            Err(mpsc::error::TrySendError::Full(_)) => {}
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!("Autosave worker is gone; edit kept locally only")
            }
        }
    }

    /// Skips the rest of the quiet period and waits until pending edits have settled.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.sender.send(AutosaveCommand::Flush(ack)).await.is_ok() {
            let _ = done.await;
        }
    }

    /// Settles pending edits and stops the worker.
    pub async fn shutdown(self) {
        let (ack, done) = oneshot::channel();
        if self.sender.send(AutosaveCommand::Shutdown(ack)).await.is_ok() {
            let _ = done.await;
        }
        if let Err(e) = self.worker.await {
            error!(error = %e, "Autosave worker panicked");
        }
    }

    /// Handles a background fetch of the page being edited. Local fields and the persisted
    /// snapshot are left untouched; returns the names of fields where the fetch disagrees
    /// with the local copy.
    pub async fn reconcile_fetched(&self, record: &PageRecord) -> Vec<&'static str> {
        let session = self.core.session.read().await;
        if session.mode.id() != Some(record.id) {
            debug!(page_id = record.id, "Ignoring fetch of a different page");
            return Vec::new();
        }

        let diverged = diverged_fields(&session.fields, &EditFields::from_record(record));
        if !diverged.is_empty() {
            debug!(page_id = record.id, fields = ?diverged, "Keeping local edits over fetched values");
        }
        diverged
    }

    /// Explicit user action: discard local edits and adopt the server's record.
    pub async fn replace_from_server(&self, record: &PageRecord) {
        let fields = EditFields::from_record(record);
        {
            let mut session = self.core.session.write().await;
            session.mode = RecordMode::Existing(record.id);
            session.persisted = Some(fields.clone());
            session.fields = fields;
            session.parent_id = record.parent_id;
        }
        self.core.pending.store(false, Ordering::SeqCst);
        self.core.state.send_modify(|state| {
            if state.status == SaveStatus::Dirty {
                state.status = SaveStatus::Idle;
            }
        });
        info!(page_id = record.id, "Replaced local edits with server record");
    }

    pub async fn mode(&self) -> RecordMode {
        self.core.session.read().await.mode
    }

    pub async fn fields(&self) -> EditFields {
        self.core.session.read().await.fields.clone()
    }

    pub async fn persisted(&self) -> Option<EditFields> {
        self.core.session.read().await.persisted.clone()
    }

    pub fn state(&self) -> SaveState {
        self.core.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SaveState> {
        self.core.state.subscribe()
    }

    /// How many times the should-save predicate has run.
    pub fn evaluations(&self) -> u64 {
        self.core.evaluations.load(Ordering::SeqCst)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.core.retry
    }
}

fn diverged_fields(local: &EditFields, fetched: &EditFields) -> Vec<&'static str> {
    let checks = [
        ("title", local.title != fetched.title),
        ("content", local.content != fetched.content),
        ("image", local.image != fetched.image),
        ("thumbnail", local.thumbnail != fetched.thumbnail),
        ("day", local.day != fetched.day),
        ("month", local.month != fetched.month),
        ("year", local.year != fetched.year),
        ("hour", local.hour != fetched.hour),
        ("minute", local.minute != fetched.minute),
        ("tags", local.tags != fetched.tags),
    ];
    checks
        .into_iter()
        .filter_map(|(name, differs)| differs.then_some(name))
        .collect()
}
