pub mod block;
pub mod page;
pub mod tags;

pub use block::{ContentBlock, HeadingLevel};
pub use page::{
    DeleteAck, PageFilter, PageId, PageInput, PageList, PageRecord, PageUpdate, RecordMode,
};
pub use tags::{PageTag, TagInput, TagSet};
