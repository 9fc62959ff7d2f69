pub mod coordinator;
pub mod fields;
pub mod predicate;
mod worker;

pub use coordinator::{AutosaveConfig, AutosaveCoordinator, RetryPolicy, SaveState, SaveStatus};
pub use fields::{EditFields, FieldEdit};
pub use predicate::should_save;
