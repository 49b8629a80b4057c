pub mod page;

pub use page::{PageRepository, PageStore};
