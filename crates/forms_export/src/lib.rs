//! CSV reports over submitted survey forms.
//!
//! Three reports are available:
//!
//! - **answers** ([`AnswerTable`]): one row per form, three columns per
//!   catalog question (correctness, encoded answer, elapsed time).
//! - **alldata** ([`SummaryTable`]): one row per form with session and
//!   demographic metadata.
//! - **specification** ([`SpecificationTable`]): one row per catalog
//!   question describing its options and correct answer.
//!
//! [`FormsCsvHandler`] selects the report for a request, scans the forms
//! table when needed and wraps the CSV in an attachment response.

pub mod answers;
pub mod encoder;
pub mod error;
pub mod handler;
pub mod report;
pub mod response;
pub mod specification;
pub mod summary;

pub use answers::AnswerTable;
pub use encoder::{EncodedAnswer, encode_answer};
pub use error::ExportError;
pub use handler::FormsCsvHandler;
pub use report::{DEFAULT_REPORT_NAME, ExportRequest, ReportType};
pub use response::ExportResponse;
pub use specification::SpecificationTable;
pub use summary::{SummaryTable, utc_offset};
