//! Domain model and ambient services shared by the forms exporter crates.
//!
//! - [`catalog`]: the fixed, ordered question catalog administered to every respondent.
//! - [`form`]: submitted survey forms as stored in the forms table.
//! - [`config`]: on-disk exporter configuration.
//! - [`logging`]: `tracing` subscriber bootstrap.

pub mod catalog;
pub mod config;
pub mod form;
pub mod logging;

pub use catalog::{CatalogError, Question, QuestionCatalog, QuestionKind};
pub use config::ExportConfig;
pub use form::{AnsweredQuestion, FormRecord, is_truthy};

/// Localized affirmative token used by mirror questions and completion flags.
pub const AFFIRMATIVE: &str = "Si";

/// Localized negative token.
pub const NEGATIVE: &str = "No";

/// Placeholder written for answers and times that were never submitted.
pub const SENTINEL: i64 = -999;
