//! Data module - CSV loading, cleaning and joining

mod cleaner;
mod joiner;
mod loader;
pub mod schema;

pub use cleaner::{
    normalize_column_names, unique_properties, CleanerError, DataCleaner, DEFAULT_DATE_FORMATS,
};
pub use joiner::{inner_join, JoinError, JoinedRow};
pub use loader::{null_counts, DataLoader, LoaderError, RawTable, DEFAULT_INFER_SCHEMA_LENGTH};
pub use schema::{GrowthRecord, PropertyKpi};
