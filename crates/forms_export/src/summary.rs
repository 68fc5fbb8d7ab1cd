use chrono::{DateTime, FixedOffset};
use forms_core::{AFFIRMATIVE, FormRecord, NEGATIVE, is_truthy};
use forms_docs::{Cell, Field, Row, csv::generate_csv};

use crate::error::ExportError;

const DATE_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Build a fixed offset from whole hours east of UTC (negative for west).
pub fn utc_offset(hours: i32) -> Result<FixedOffset, ExportError> {
    hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .ok_or(ExportError::InvalidOffset(hours))
}

/// Session and demographic report: one row per form.
pub struct SummaryTable {
    offset: FixedOffset,
}

impl SummaryTable {
    /// `offset` is the local time zone submission dates are rendered in.
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn fields(&self) -> Vec<Field> {
        vec![
            Field::new("ID", "id"),
            Field::new("FECHA", "ts"),
            Field::new("EMAIL", "email"),
            Field::new("EDAD", "age"),
            Field::new("GENERO", "gender"),
            Field::new("EDUCACION", "educationLevel"),
            Field::new("USO_MORAVEC", "triedMoravec"),
            Field::new("FORMULARIO_COMPLETO", "isFinished"),
            Field::new("PREGUNTAS_CONTESTADAS", "answeredQuestionsAmount"),
            Field::new("PREGUNTAS_CORRECTAS", "correctQuestionsAmount"),
            Field::new("TIEMPO_TOTAL", "totalCompletionTime"),
            Field::new("COMENTARIO", "comment"),
        ]
    }

    /// Render epoch seconds as `DD/MM/YYYY HH:mm` in the configured offset.
    pub fn format_timestamp(&self, ts: i64) -> Result<String, ExportError> {
        let utc = DateTime::from_timestamp(ts, 0).ok_or(ExportError::InvalidTimestamp(ts))?;
        Ok(utc.with_timezone(&self.offset).format(DATE_FORMAT).to_string())
    }

    pub fn row(&self, form: &FormRecord) -> Result<Row, ExportError> {
        let mut row = Row::new();
        row.set("id", form.id.as_str());
        row.set("ts", self.format_timestamp(form.ts)?);
        row.set("email", form.email.as_str());
        row.set("age", count_cell(form.age));
        row.set("gender", text_cell(form.gender.as_deref()));
        row.set("educationLevel", text_cell(form.education_level.as_deref()));
        row.set("triedMoravec", raw_cell(&form.tried_moravec));
        row.set("isFinished", yes_no(form.is_finished));
        row.set("answeredQuestionsAmount", count_cell(form.answered_questions_amount));
        row.set("correctQuestionsAmount", count_cell(form.correct_questions_amount));
        row.set(
            "totalCompletionTime",
            match form.total_completion_time {
                Some(t) if t != 0.0 && !t.is_nan() => Cell::number(t),
                _ => Cell::Empty,
            },
        );
        row.set("comment", text_cell(form.comment.as_deref().map(sanitize_comment).as_deref()));
        Ok(row)
    }

    pub fn build(&self, forms: &[FormRecord]) -> Result<String, ExportError> {
        let rows = forms
            .iter()
            .map(|form| self.row(form))
            .collect::<Result<Vec<_>, _>>()?;
        generate_csv(&self.fields(), &rows).map_err(ExportError::csv)
    }
}

/// Commas in free text are replaced with semicolons before serialization.
pub fn sanitize_comment(comment: &str) -> String {
    comment.replace(',', ";")
}

fn yes_no(flag: bool) -> Cell {
    Cell::text(if flag { AFFIRMATIVE } else { NEGATIVE })
}

// Written as submitted; falsy values leave the field blank.
fn raw_cell(value: &serde_json::Value) -> Cell {
    if is_truthy(value) {
        Cell::from_json(value)
    } else {
        Cell::Empty
    }
}

fn text_cell(value: Option<&str>) -> Cell {
    value.map_or(Cell::Empty, Cell::text)
}

// Zero counts are indistinguishable from "not recorded" upstream.
fn count_cell(value: Option<u32>) -> Cell {
    match value {
        Some(n) if n > 0 => Cell::Int(i64::from(n)),
        _ => Cell::Empty,
    }
}
