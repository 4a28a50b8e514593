use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::question::Question;

/// 国家级裁判及格线
pub const PASS_SCORE: u32 = 80;

/// 作答记录：题目 ID → 作答
///
/// 不在表中的题目视为未作答。
pub type AnswerMap = HashMap<String, bool>;

/// 判分规则：作答与标准答案一致才算正确，未作答一律算错
pub fn is_correct(question: &Question, answers: &AnswerMap) -> bool {
    answers.get(&question.id) == Some(&question.correct_answer)
}

/// 考试成绩，交卷时一次性计算
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResult {
    pub total_questions: usize,
    pub correct_answers: usize,
    /// 0..=100
    pub score: u32,
    /// 保持原始题目顺序
    pub wrong_questions: Vec<Question>,
}

impl ExamResult {
    /// 根据最终题目集合与作答记录计算成绩
    ///
    /// 空题目集合得 0 分。
    pub fn compute(questions: &[Question], answers: &AnswerMap) -> Self {
        let (correct, wrong): (Vec<&Question>, Vec<&Question>) =
            questions.iter().partition(|q| is_correct(q, answers));

        Self {
            total_questions: questions.len(),
            correct_answers: correct.len(),
            score: percentage(correct.len(), questions.len()),
            wrong_questions: wrong.into_iter().cloned().collect(),
        }
    }

    /// 是否达到及格线（`score >= PASS_SCORE`）
    pub fn is_passed(&self) -> bool {
        self.score >= PASS_SCORE
    }

    pub fn is_perfect(&self) -> bool {
        self.total_questions > 0 && self.wrong_questions.is_empty()
    }
}

fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (correct as f64 / total as f64 * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::QuestionKind;

    fn question(id: &str, correct_answer: bool) -> Question {
        Question {
            id: id.to_string(),
            kind: QuestionKind::Theory,
            content: format!("题目 {}", id),
            media_hint: None,
            correct_answer,
            explanation: String::new(),
        }
    }

    #[test]
    fn test_two_of_three_scores_67() {
        let questions = vec![question("1", true), question("2", false), question("3", true)];
        let answers: AnswerMap = [("1", true), ("2", true), ("3", true)]
            .into_iter()
            .map(|(id, a)| (id.to_string(), a))
            .collect();

        let result = ExamResult::compute(&questions, &answers);

        assert_eq!(result.total_questions, 3);
        assert_eq!(result.correct_answers, 2);
        assert_eq!(result.score, 67);
        assert_eq!(result.wrong_questions, vec![questions[1].clone()]);
    }

    #[test]
    fn test_unanswered_counts_as_wrong() {
        let questions = vec![question("1", false), question("2", true)];
        let answers = AnswerMap::new();

        assert!(!is_correct(&questions[0], &answers));

        let result = ExamResult::compute(&questions, &answers);
        assert_eq!(result.correct_answers, 0);
        assert_eq!(result.score, 0);
        assert_eq!(result.wrong_questions.len(), 2);
    }

    #[test]
    fn test_wrong_questions_keep_original_order() {
        let questions: Vec<Question> = (0..6)
            .map(|i| question(&i.to_string(), i % 2 == 0))
            .collect();
        let answers: AnswerMap = questions
            .iter()
            .map(|q| (q.id.clone(), false))
            .collect();

        let result = ExamResult::compute(&questions, &answers);

        let ids: Vec<&str> = result.wrong_questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["0", "2", "4"]);
        assert_eq!(
            result.correct_answers + result.wrong_questions.len(),
            result.total_questions
        );
    }

    #[test]
    fn test_empty_set_scores_zero() {
        let result = ExamResult::compute(&[], &AnswerMap::new());

        assert_eq!(result.total_questions, 0);
        assert_eq!(result.score, 0);
        assert!(result.wrong_questions.is_empty());
        assert!(!result.is_perfect());
    }

    #[test]
    fn test_pass_line_is_inclusive() {
        let mut questions: Vec<Question> =
            (0..5).map(|i| question(&i.to_string(), true)).collect();
        let mut answers: AnswerMap = questions.iter().map(|q| (q.id.clone(), true)).collect();
        answers.insert("4".to_string(), false);

        let passed = ExamResult::compute(&questions, &answers);
        assert_eq!(passed.score, 80);
        assert!(passed.is_passed());

        questions.push(question("5", true));
        let failed = ExamResult::compute(&questions, &answers);
        assert_eq!(failed.score, 67);
        assert!(!failed.is_passed());
    }

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(10, 10), 100);
    }
}
