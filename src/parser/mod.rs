pub mod dialect;
pub mod inline;

pub use dialect::{parse_dialect, parse_line, serialize_block, serialize_dialect};
pub use inline::{escape_html, render_inline_html};
