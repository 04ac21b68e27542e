//! Entity records and request payloads.

mod media;
mod page;
mod post;

pub use media::{Media, NewMedia};
pub use page::{NewPage, Page, PageChanges, PAGE_TITLE_MAX_LEN};
pub use post::{Post, PostFilter, PostInput};
