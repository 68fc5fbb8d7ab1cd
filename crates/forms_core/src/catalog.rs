use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures while loading the question catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate question id in catalog: {0}")]
    DuplicateId(String),
}

// ---------------------------------------------------------------------------
// Question definitions
// ---------------------------------------------------------------------------

/// The four question kinds administered by the survey.
///
/// Catalog entries carrying any other type tag deserialize to
/// [`QuestionKind::Unrecognized`] so every consumer has to handle them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionKind {
    #[serde(rename = "multiple-choice-question")]
    MultipleChoice,
    #[serde(rename = "scale-question")]
    Scale,
    #[serde(rename = "visuospatial-question")]
    Visuospatial,
    #[serde(rename = "mirror-question")]
    Mirror,
    #[serde(other)]
    Unrecognized,
}

/// A single catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    /// Ordered options; only meaningful for multiple-choice questions.
    #[serde(default)]
    pub options: Vec<serde_json::Value>,
    #[serde(default)]
    pub correct_answer: serde_json::Value,
}

impl Question {
    /// Upper-cased identifier used to derive CSV column names.
    pub fn column_id(&self) -> String {
        self.id.to_uppercase()
    }

    /// 1-based position of `value` within the options, or 0 when absent.
    pub fn option_position(&self, value: &serde_json::Value) -> i64 {
        self.options
            .iter()
            .position(|opt| same_value(opt, value))
            .map_or(0, |idx| idx as i64 + 1)
    }
}

// `1` and `1.0` are the same option; strings never match numbers.
fn same_value(a: &serde_json::Value, b: &serde_json::Value) -> bool {
    use serde_json::Value;
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

// ---------------------------------------------------------------------------
// QuestionCatalog
// ---------------------------------------------------------------------------

/// The fixed, ordered set of questions. Loaded once at startup and shared.
#[derive(Debug, Clone, Default)]
pub struct QuestionCatalog {
    questions: Vec<Question>,
}

impl QuestionCatalog {
    /// Build a catalog from already-parsed questions, rejecting duplicate ids.
    pub fn new(questions: Vec<Question>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for question in &questions {
            if !seen.insert(question.id.as_str()) {
                return Err(CatalogError::DuplicateId(question.id.clone()));
            }
        }
        Ok(Self { questions })
    }

    /// Parse a JSON array of question objects.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let questions: Vec<Question> = serde_json::from_str(json)?;
        Self::new(questions)
    }

    /// Load the catalog from a JSON file.
    pub fn load_from_path(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_json_str(&content)?;
        tracing::info!(
            "Loaded {} questions from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Question> {
        self.questions.iter()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

impl<'a> IntoIterator for &'a QuestionCatalog {
    type Item = &'a Question;
    type IntoIter = std::slice::Iter<'a, Question>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
