use std::collections::HashMap;

use crate::models::question::QuestionWithAnswers;
use uuid::Uuid;

/// Per-question outcome of a submission. `is_correct` is the authoritative
/// snapshot persisted with the result; it is evaluated against the answer's
/// current correctness flag at this very moment and never again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredQuestion {
    pub question_id: Uuid,
    pub selected_answer_id: Option<Uuid>,
    pub is_correct: bool,
}

#[derive(Debug, Clone)]
pub struct Scorecard {
    pub rows: Vec<ScoredQuestion>,
    pub total_questions: i32,
    pub correct_answers: i32,
    pub percentage: f64,
}

/// Score a selection mapping against the ordered question set.
///
/// A question with no entry in `selections` (or an explicit `None`) is scored
/// as unanswered and incorrect but still counts toward the total. A selected
/// answer id that does not belong to its question is treated the same way;
/// the mismatch is logged, not surfaced as a failure.
pub fn score(
    questions: &[QuestionWithAnswers],
    selections: &HashMap<Uuid, Option<Uuid>>,
) -> Scorecard {
    let mut rows = Vec::with_capacity(questions.len());
    let mut correct_answers: i32 = 0;

    for q in questions {
        let submitted = selections.get(&q.question.id).copied().flatten();
        let selected = submitted.and_then(|answer_id| {
            let resolved = q.find_answer(answer_id);
            if resolved.is_none() {
                tracing::warn!(
                    question_id = %q.question.id,
                    answer_id = %answer_id,
                    "submitted answer does not belong to its question; recording as unanswered"
                );
            }
            resolved
        });

        let is_correct = selected.map(|a| a.is_correct).unwrap_or(false);
        if is_correct {
            correct_answers += 1;
        }

        rows.push(ScoredQuestion {
            question_id: q.question.id,
            selected_answer_id: selected.map(|a| a.id),
            is_correct,
        });
    }

    let total_questions = questions.len() as i32;
    let percentage = if total_questions > 0 {
        f64::from(correct_answers) / f64::from(total_questions) * 100.0
    } else {
        0.0
    };

    Scorecard {
        rows,
        total_questions,
        correct_answers,
        percentage,
    }
}
