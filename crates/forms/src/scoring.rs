//! Coarse completeness score attached to every application.

use crate::answers::Answers;

const BASE_SCORE: i32 = 50;
const POINTS_PER_ANSWER: i32 = 5;
const MAX_ANSWER_BONUS: i32 = 50;
const MAX_SCORE: i32 = 100;

/// 0 with no answers; otherwise 50 plus 5 per answered field, at most 100.
pub fn completeness_score(answers: &Answers) -> i32 {
    if answers.is_empty() {
        return 0;
    }
    let answered = i32::try_from(answers.len()).unwrap_or(i32::MAX);
    let bonus = answered.saturating_mul(POINTS_PER_ANSWER).min(MAX_ANSWER_BONUS);
    (BASE_SCORE + bonus).min(MAX_SCORE)
}
