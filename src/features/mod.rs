pub mod library;
pub mod studio;

pub use library::{custom_date_label, LibraryTab, LibraryView};
pub use studio::{ImageSlot, Studio};
