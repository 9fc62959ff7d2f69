use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

pub mod autosave;

/// Client-side location updates, e.g. `/studio/new` becoming `/studio/42` after a create.
#[async_trait]
pub trait Navigator: Send + Sync {
    /// Replaces the current location without reloading the studio.
    async fn replace_location(&self, path: &str) -> Result<()>;
}

/// Headless navigator: there is no address bar, so the new location is only logged.
pub struct LoggingNavigator;

#[async_trait]
impl Navigator for LoggingNavigator {
    async fn replace_location(&self, path: &str) -> Result<()> {
        info!(location = path, "Location replaced");
        Ok(())
    }
}
