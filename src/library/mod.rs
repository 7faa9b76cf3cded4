pub mod catalog;
pub mod import;
pub mod mixbook;

pub use catalog::Catalog;
pub use import::{DuplicatePolicy, ImportReport, export, import};
pub use mixbook::MixBook;
