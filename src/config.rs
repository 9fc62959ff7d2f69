use directories::ProjectDirs;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const DEFAULT_BUCKET: &str = "photonslib";
pub const DEFAULT_DEBOUNCE_MS: u64 = 1000;

#[derive(Clone, Debug)]
pub struct FotonsConfig {
    pub api_url: String,
    pub storage_url: String,
    pub storage_public_url: String,
    pub storage_bucket: String,
    pub storage_key: String,
    pub autosave_debounce: Duration,
    pub session_file: PathBuf,
    pub request_timeout: Duration,
}

impl FotonsConfig {
    pub fn from_env() -> Self {
        let api_url =
            std::env::var("FOTONS_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let storage_url = std::env::var("FOTONS_STORAGE_URL").unwrap_or_default();

        // public objects are usually served from a different host than the upload api
        let storage_public_url =
            std::env::var("FOTONS_STORAGE_PUBLIC_URL").unwrap_or_else(|_| storage_url.clone());

        let storage_bucket =
            std::env::var("FOTONS_STORAGE_BUCKET").unwrap_or_else(|_| DEFAULT_BUCKET.to_string());

        let storage_key = std::env::var("FOTONS_STORAGE_KEY").unwrap_or_default();

        let autosave_debounce = Duration::from_millis(
            std::env::var("FOTONS_AUTOSAVE_DEBOUNCE_MS")
                .ok()
                .and_then(|val| val.parse::<u64>().ok())
                .unwrap_or(DEFAULT_DEBOUNCE_MS),
        );

        let session_file = std::env::var("FOTONS_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_session_file());

        let request_timeout = Duration::from_secs(
            std::env::var("FOTONS_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|val| val.parse::<u64>().ok())
                .unwrap_or(30),
        );

        Self {
            api_url,
            storage_url,
            storage_public_url,
            storage_bucket,
            storage_key,
            autosave_debounce,
            session_file,
            request_timeout,
        }
    }

    pub fn storage_configured(&self) -> bool {
        !self.storage_url.is_empty() && !self.storage_key.is_empty()
    }
}

// falls back to the working directory when the platform has no data dir (containers, CI)
fn default_session_file() -> PathBuf {
    ProjectDirs::from("org", "fotons", "biblioteca-fotons")
        .map(|dirs| dirs.data_dir().join("session.json"))
        .unwrap_or_else(|| PathBuf::from(".fotons-session.json"))
}
