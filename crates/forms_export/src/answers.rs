use forms_core::{FormRecord, QuestionCatalog};
use forms_docs::{Field, Row, csv::generate_csv};

use crate::encoder::encode_answer;
use crate::error::ExportError;

/// Per-question answer report: one row per form, three columns per question.
pub struct AnswerTable<'a> {
    catalog: &'a QuestionCatalog,
}

impl<'a> AnswerTable<'a> {
    pub fn new(catalog: &'a QuestionCatalog) -> Self {
        Self { catalog }
    }

    /// `ID` followed by `{ID}_CORRECTA`, `{ID}_RESPUESTA`, `{ID}_TIEMPO`
    /// for every question in catalog order.
    pub fn fields(&self) -> Vec<Field> {
        let mut fields = Vec::with_capacity(1 + self.catalog.len() * 3);
        fields.push(Field::new("ID", "id"));
        for question in self.catalog {
            let [correct, answer, time] = column_names(&question.column_id());
            fields.push(Field::keyed(correct));
            fields.push(Field::keyed(answer));
            fields.push(Field::keyed(time));
        }
        fields
    }

    pub fn row(&self, form: &FormRecord) -> Row {
        let mut row = Row::new();
        row.set("id", form.id.as_str());
        for question in self.catalog {
            let encoded = encode_answer(question, &form.questions);
            let [correct, answer, time] = column_names(&question.column_id());
            row.set(correct, encoded.correct);
            row.set(answer, encoded.answer);
            row.set(time, encoded.time);
        }
        row
    }

    pub fn build(&self, forms: &[FormRecord]) -> Result<String, ExportError> {
        let rows: Vec<Row> = forms.iter().map(|form| self.row(form)).collect();
        generate_csv(&self.fields(), &rows).map_err(ExportError::csv)
    }
}

fn column_names(column_id: &str) -> [String; 3] {
    [
        format!("{column_id}_CORRECTA"),
        format!("{column_id}_RESPUESTA"),
        format!("{column_id}_TIEMPO"),
    ]
}
