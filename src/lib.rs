pub mod adapters;
pub mod chemistry;
pub mod error;
pub mod library;
pub mod mixing;
pub mod models;
pub mod session;

pub use crate::adapters::store::{ExportFormat, FileStore, LibraryStore};
pub use crate::error::AppError;
pub use crate::library::{Catalog, DuplicatePolicy, ImportReport, MixBook};
pub use crate::mixing::aggregator::{
    CalculationSummary, DisplayMode, FertilizerLookup, MixComparison, NutrientProfile, aggregate,
    compare, compute_summary,
};
pub use crate::mixing::naming::natural_cmp;
pub use crate::models::{
    AppSettings, ExportData, Fertilizer, FertilizerInput, FertilizerMix, FertilizerQuantity,
    NutrientKind, UnitSystem,
};
pub use crate::session::Session;
