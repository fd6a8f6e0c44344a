pub mod projection_model;
pub mod summary_service;
pub mod wage_model;

pub use projection_model::ProjectionModel;
pub use summary_service::{SavingsTotals, SummaryService};
pub use wage_model::WageModel;
