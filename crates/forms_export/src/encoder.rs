use forms_core::{AFFIRMATIVE, AnsweredQuestion, Question, QuestionKind, SENTINEL};
use forms_docs::Cell;

/// The three answer-table values for one question of one form.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedAnswer {
    /// 1 when the submitted answer was marked correct, else 0.
    pub correct: i64,
    pub answer: Cell,
    /// Elapsed seconds, or the sentinel when not recorded.
    pub time: Cell,
}

impl EncodedAnswer {
    /// Values written for a question the respondent never reached.
    pub fn unanswered() -> Self {
        Self {
            correct: 0,
            answer: Cell::Int(SENTINEL),
            time: Cell::Int(SENTINEL),
        }
    }
}

/// Encode the answer `answers` holds for `question`.
///
/// Unrecognized question kinds still report correctness and time but leave
/// the answer cell empty.
pub fn encode_answer(question: &Question, answers: &[AnsweredQuestion]) -> EncodedAnswer {
    let Some(entry) = answers.iter().find(|a| a.id == question.id) else {
        return EncodedAnswer::unanswered();
    };

    let answer = match question.kind {
        QuestionKind::MultipleChoice => encode_multiple_choice(question, entry),
        QuestionKind::Scale => encode_scale(entry),
        QuestionKind::Visuospatial => encode_visuospatial(entry),
        QuestionKind::Mirror => encode_mirror(entry),
        QuestionKind::Unrecognized => Cell::Empty,
    };

    EncodedAnswer {
        correct: i64::from(entry.is_correct),
        answer,
        time: encode_time(entry),
    }
}

/// 1-based option index, 0 when the answer is not one of the options.
fn encode_multiple_choice(question: &Question, entry: &AnsweredQuestion) -> Cell {
    Cell::Int(question.option_position(&entry.answer))
}

/// Scale answers only record whether the respondent hit the expected value.
fn encode_scale(entry: &AnsweredQuestion) -> Cell {
    Cell::Int(i64::from(entry.is_correct))
}

fn encode_visuospatial(entry: &AnsweredQuestion) -> Cell {
    Cell::from_json(&entry.answer)
}

fn encode_mirror(entry: &AnsweredQuestion) -> Cell {
    Cell::Int(i64::from(entry.answer.as_str() == Some(AFFIRMATIVE)))
}

// A zero or missing time means the client never measured it.
fn encode_time(entry: &AnsweredQuestion) -> Cell {
    match entry.completion_time {
        Some(t) if t != 0.0 && !t.is_nan() => Cell::number(t),
        _ => Cell::Int(SENTINEL),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn question(id: &str, kind: QuestionKind, options: &[&str], correct: Value) -> Question {
        Question {
            id: id.into(),
            label: format!("Pregunta {id}"),
            kind,
            options: options.iter().map(|o| Value::from(*o)).collect(),
            correct_answer: correct,
        }
    }

    fn answered(id: &str, answer: Value, is_correct: bool, time: Option<f64>) -> AnsweredQuestion {
        AnsweredQuestion {
            id: id.into(),
            answer,
            is_correct,
            completion_time: time,
        }
    }

    #[test]
    fn test_missing_answer_yields_sentinels() {
        let kinds = [
            QuestionKind::MultipleChoice,
            QuestionKind::Scale,
            QuestionKind::Visuospatial,
            QuestionKind::Mirror,
            QuestionKind::Unrecognized,
        ];
        let answers = vec![answered("other", json!("x"), true, Some(3.0))];
        for kind in kinds {
            let q = question("q1", kind, &[], Value::Null);
            assert_eq!(encode_answer(&q, &answers), EncodedAnswer::unanswered());
            assert_eq!(encode_answer(&q, &[]), EncodedAnswer::unanswered());
        }
        let sentinel = EncodedAnswer::unanswered();
        assert_eq!(sentinel.correct, 0);
        assert_eq!(sentinel.answer, Cell::Int(-999));
        assert_eq!(sentinel.time, Cell::Int(-999));
    }

    #[test]
    fn test_lookup_is_exact() {
        let q = question("q1", QuestionKind::Scale, &[], json!(5));
        let answers = vec![answered("Q1", json!(5), true, Some(2.0))];
        assert_eq!(encode_answer(&q, &answers), EncodedAnswer::unanswered());
    }

    #[test]
    fn test_multiple_choice_index() {
        let q = question("q1", QuestionKind::MultipleChoice, &["a", "b", "c"], json!("b"));
        let encoded = encode_answer(&q, &[answered("q1", json!("c"), false, Some(4.0))]);
        assert_eq!(encoded.correct, 0);
        assert_eq!(encoded.answer, Cell::Int(3));
        assert_eq!(encoded.time, Cell::Int(4));
    }

    #[test]
    fn test_multiple_choice_unknown_option_is_zero() {
        let q = question("q1", QuestionKind::MultipleChoice, &["a", "b"], json!("a"));
        let encoded = encode_answer(&q, &[answered("q1", json!("z"), false, None)]);
        assert_eq!(encoded.answer, Cell::Int(0));
        let encoded = encode_answer(&q, &[answered("q1", Value::Null, false, None)]);
        assert_eq!(encoded.answer, Cell::Int(0));
    }

    #[test]
    fn test_scale_encodes_correctness_not_raw_value() {
        let q = question("q2", QuestionKind::Scale, &[], json!(5));
        let right = encode_answer(&q, &[answered("q2", json!(5), true, Some(1.5))]);
        assert_eq!(right.answer, Cell::Int(1));
        assert_eq!(right.time, Cell::Float(1.5));

        let wrong = encode_answer(&q, &[answered("q2", json!(7), false, Some(1.0))]);
        assert_eq!(wrong.answer, Cell::Int(0));
        assert_eq!(wrong.correct, 0);
    }

    #[test]
    fn test_visuospatial_passthrough() {
        let q = question("q3", QuestionKind::Visuospatial, &[], json!(1));
        let encoded = encode_answer(&q, &[answered("q3", json!(2), false, Some(9.0))]);
        assert_eq!(encoded.answer, Cell::Int(2));
    }

    #[test]
    fn test_mirror_exact_affirmative_only() {
        let q = question("q4", QuestionKind::Mirror, &[], json!("Si"));
        let encode = |answer: Value| encode_answer(&q, &[answered("q4", answer, true, None)]).answer;
        assert_eq!(encode(json!("Si")), Cell::Int(1));
        assert_eq!(encode(json!("si")), Cell::Int(0));
        assert_eq!(encode(json!("SI")), Cell::Int(0));
        assert_eq!(encode(json!("No")), Cell::Int(0));
        assert_eq!(encode(json!(true)), Cell::Int(0));
    }

    #[test]
    fn test_unrecognized_kind_leaves_answer_empty() {
        let q = question("q5", QuestionKind::Unrecognized, &[], Value::Null);
        let encoded = encode_answer(&q, &[answered("q5", json!("texto"), true, Some(6.0))]);
        assert_eq!(encoded.correct, 1);
        assert_eq!(encoded.answer, Cell::Empty);
        assert_eq!(encoded.time, Cell::Int(6));
    }

    #[test]
    fn test_zero_time_is_sentinel() {
        let q = question("q2", QuestionKind::Scale, &[], json!(5));
        let encoded = encode_answer(&q, &[answered("q2", json!(5), true, Some(0.0))]);
        assert_eq!(encoded.time, Cell::Int(-999));
    }
}
