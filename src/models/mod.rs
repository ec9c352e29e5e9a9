//! Data models for chapter identity and selection.

mod chapter;
mod range;

pub use chapter::{pad_id, ChapterIdentity, TitleShape, UNKNOWN_ID};
pub use range::{ChapterKey, ChapterRanges, RangeError};
