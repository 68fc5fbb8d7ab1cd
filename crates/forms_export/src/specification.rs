use forms_core::{AFFIRMATIVE, NEGATIVE, Question, QuestionCatalog, QuestionKind};
use forms_docs::{Cell, Field, Row, csv::generate_csv};
use tracing::debug;

use crate::error::ExportError;

/// Option slots `0`..`4`.
const OPTION_SLOTS: usize = 5;

/// Question specification sheet: one row per catalog question.
pub struct SpecificationTable<'a> {
    catalog: &'a QuestionCatalog,
}

impl<'a> SpecificationTable<'a> {
    pub fn new(catalog: &'a QuestionCatalog) -> Self {
        Self { catalog }
    }

    pub fn fields(&self) -> Vec<Field> {
        let mut fields = vec![Field::new("ID", "id"), Field::new("PREGUNTA", "label")];
        fields.extend((0..OPTION_SLOTS).map(|slot| Field::new(slot.to_string(), slot_key(slot))));
        fields.push(Field::new("CORRECTA", "correct"));
        fields
    }

    pub fn row(&self, question: &Question) -> Row {
        let mut row = Row::new();
        row.set("id", question.column_id());
        row.set("label", question.label.as_str());
        for slot in 0..OPTION_SLOTS {
            row.set(slot_key(slot), Cell::Empty);
        }
        row.set("correct", Cell::Empty);

        match question.kind {
            QuestionKind::MultipleChoice => {
                // Options occupy slots 1..=4; slot 0 stays blank.
                let capacity = OPTION_SLOTS - 1;
                if question.options.len() > capacity {
                    debug!(
                        "Question {} has {} options, only {capacity} fit the specification sheet",
                        question.id,
                        question.options.len()
                    );
                }
                for (i, option) in question.options.iter().take(capacity).enumerate() {
                    row.set(slot_key(i + 1), Cell::from_json(option));
                }
                row.set("correct", question.option_position(&question.correct_answer));
            }
            QuestionKind::Scale => {
                let correct = Cell::from_json(&question.correct_answer);
                row.set(slot_key(0), format!("DIFERENTE DE {correct}"));
                row.set(slot_key(1), correct);
                row.set("correct", Cell::Int(1));
            }
            QuestionKind::Visuospatial => {
                for value in 1..=3i64 {
                    row.set(slot_key(value as usize), value);
                }
                row.set("correct", Cell::Int(1));
            }
            QuestionKind::Mirror => {
                row.set(slot_key(0), NEGATIVE);
                row.set(slot_key(1), AFFIRMATIVE);
                row.set("correct", Cell::Int(1));
            }
            QuestionKind::Unrecognized => {}
        }
        row
    }

    pub fn build(&self) -> Result<String, ExportError> {
        let rows: Vec<Row> = self.catalog.iter().map(|q| self.row(q)).collect();
        generate_csv(&self.fields(), &rows).map_err(ExportError::csv)
    }
}

fn slot_key(slot: usize) -> String {
    format!("opt{slot}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn question(kind: QuestionKind, options: &[&str], correct: Value) -> Question {
        Question {
            id: "q7".into(),
            label: "Texto".into(),
            kind,
            options: options.iter().map(|o| Value::from(*o)).collect(),
            correct_answer: correct,
        }
    }

    fn cell(row: &Row, key: &str) -> String {
        row.get(key).map(Cell::to_string).unwrap_or_default()
    }

    fn table_row(q: &Question) -> Row {
        let catalog = QuestionCatalog::default();
        SpecificationTable::new(&catalog).row(q)
    }

    #[test]
    fn test_fields() {
        let catalog = QuestionCatalog::default();
        let labels: Vec<String> = SpecificationTable::new(&catalog)
            .fields()
            .into_iter()
            .map(|f| f.label)
            .collect();
        assert_eq!(labels, vec!["ID", "PREGUNTA", "0", "1", "2", "3", "4", "CORRECTA"]);
    }

    #[test]
    fn test_multiple_choice_row() {
        let q = question(QuestionKind::MultipleChoice, &["rojo", "verde", "azul"], json!("azul"));
        let row = table_row(&q);
        assert_eq!(cell(&row, "id"), "Q7");
        assert_eq!(cell(&row, "label"), "Texto");
        assert_eq!(cell(&row, "opt0"), "");
        assert_eq!(cell(&row, "opt1"), "rojo");
        assert_eq!(cell(&row, "opt2"), "verde");
        assert_eq!(cell(&row, "opt3"), "azul");
        assert_eq!(cell(&row, "opt4"), "");
        assert_eq!(cell(&row, "correct"), "3");
    }

    #[test]
    fn test_numeric_options_render_as_numbers() {
        let mut q = question(QuestionKind::MultipleChoice, &[], json!(10));
        q.options = vec![json!(5), json!(10), json!(2.5)];
        let row = table_row(&q);
        assert_eq!(row.get("opt1"), Some(&Cell::Int(5)));
        assert_eq!(row.get("opt3"), Some(&Cell::Float(2.5)));
        assert_eq!(cell(&row, "correct"), "2");
    }

    #[test]
    fn test_multiple_choice_truncates_extra_options() {
        let q = question(QuestionKind::MultipleChoice, &["a", "b", "c", "d", "e"], json!("e"));
        let row = table_row(&q);
        assert_eq!(cell(&row, "opt4"), "d");
        assert_eq!(row.get("opt5"), None);
        assert_eq!(cell(&row, "correct"), "5");
    }

    #[test]
    fn test_scale_row() {
        let row = table_row(&question(QuestionKind::Scale, &[], json!(5)));
        assert_eq!(cell(&row, "opt0"), "DIFERENTE DE 5");
        assert_eq!(cell(&row, "opt1"), "5");
        assert_eq!(cell(&row, "correct"), "1");
    }

    #[test]
    fn test_visuospatial_row() {
        let row = table_row(&question(QuestionKind::Visuospatial, &[], json!(1)));
        assert_eq!(cell(&row, "opt0"), "");
        assert_eq!(cell(&row, "opt1"), "1");
        assert_eq!(cell(&row, "opt2"), "2");
        assert_eq!(cell(&row, "opt3"), "3");
        assert_eq!(cell(&row, "correct"), "1");
    }

    #[test]
    fn test_mirror_row() {
        let row = table_row(&question(QuestionKind::Mirror, &[], json!("Si")));
        assert_eq!(cell(&row, "opt0"), "No");
        assert_eq!(cell(&row, "opt1"), "Si");
        assert_eq!(cell(&row, "correct"), "1");
    }

    #[test]
    fn test_unrecognized_row_is_blank() {
        let row = table_row(&question(QuestionKind::Unrecognized, &["x"], json!("x")));
        for key in ["opt0", "opt1", "opt2", "opt3", "opt4", "correct"] {
            assert_eq!(cell(&row, key), "", "{key} should be blank");
        }
        assert_eq!(cell(&row, "id"), "Q7");
    }

    #[test]
    fn test_build_uses_catalog_order() {
        let catalog = QuestionCatalog::from_json_str(
            r#"[
                {"id": "b", "label": "Segunda", "type": "mirror-question"},
                {"id": "a", "label": "Primera", "type": "scale-question", "correctAnswer": 3}
            ]"#,
        )
        .unwrap();
        let csv = SpecificationTable::new(&catalog).build().unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "ID,PREGUNTA,0,1,2,3,4,CORRECTA");
        assert_eq!(lines[1], "B,Segunda,No,Si,,,,1");
        assert_eq!(lines[2], "A,Primera,DIFERENTE DE 3,3,,,,1");
    }
}
