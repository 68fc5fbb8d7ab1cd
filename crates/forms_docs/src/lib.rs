// Report document generation (CSV)

pub mod csv;

pub use self::csv::{Cell, Field, Row};
