pub mod catalog;
pub mod error;

pub use crate::catalog::{CatalogEvent, FileOutcome, Summary, catalog, catalog_file, run, validate_root};
