//! 考试会话 - 流程层
//!
//! 单场限时考试的状态机：加载中 → 答题中 → 已交卷（或已取消）

use tracing::{debug, info};

use crate::error::{AppResult, BusinessError};
use crate::models::{AnswerMap, ExamResult, Question};

/// 考试阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExamPhase {
    /// 正在加载题目
    Loading,
    /// 答题中，倒计时运行
    InProgress,
    /// 已交卷（终态）
    Submitted,
    /// 已放弃（终态，不产生成绩）
    Cancelled,
}

/// 一次倒计时的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// 不在答题阶段，忽略
    Ignored,
    /// 倒计时继续，附剩余秒数
    Running(u32),
    /// 时间到，已自动交卷
    Expired(ExamResult),
}

/// 考试会话
///
/// 不变量：
/// - 题目加载后 `current_index` 始终在 `[0, len-1]` 内
/// - 每次 tick 剩余时间恰好减 1，不会小于 0
/// - 每场考试最多产生一份成绩，产生后不再改变
#[derive(Debug, Clone)]
pub struct ExamSession {
    questions: Vec<Question>,
    current_index: usize,
    answers: AnswerMap,
    seconds_remaining: u32,
    phase: ExamPhase,
    result: Option<ExamResult>,
}

impl Default for ExamSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ExamSession {
    /// 创建处于加载阶段的会话
    pub fn new() -> Self {
        Self {
            questions: Vec::new(),
            current_index: 0,
            answers: AnswerMap::new(),
            seconds_remaining: 0,
            phase: ExamPhase::Loading,
            result: None,
        }
    }

    /// 题目加载完成，开始答题
    ///
    /// # 参数
    /// - `questions`: 本场考试的固定题目
    /// - `duration_secs`: 考试时长（秒）
    pub fn begin(&mut self, questions: Vec<Question>, duration_secs: u32) -> AppResult<()> {
        self.expect_phase(ExamPhase::Loading, "begin")?;

        info!("📝 考试开始: {} 道题，限时 {} 秒", questions.len(), duration_secs);
        self.questions = questions;
        self.current_index = 0;
        self.seconds_remaining = duration_secs;
        self.phase = ExamPhase::InProgress;
        Ok(())
    }

    /// 记录作答，覆盖之前的答案，不移动当前位置
    pub fn record_answer(&mut self, question_id: &str, answer: bool) -> AppResult<()> {
        self.expect_phase(ExamPhase::InProgress, "record_answer")?;

        if !self.questions.iter().any(|q| q.id == question_id) {
            return Err(BusinessError::UnknownQuestion {
                id: question_id.to_string(),
            }
            .into());
        }

        debug!("作答: {} → {}", question_id, answer);
        self.answers.insert(question_id.to_string(), answer);
        Ok(())
    }

    /// 为当前题目作答
    pub fn answer_current(&mut self, answer: bool) -> AppResult<()> {
        let id = match self.current_question() {
            Some(question) => question.id.clone(),
            None => {
                return Err(BusinessError::InvalidPhase {
                    operation: "answer_current",
                    phase: self.phase,
                }
                .into())
            }
        };
        self.record_answer(&id, answer)
    }

    /// 前后翻题，结果限制在 `[0, len-1]`
    ///
    /// # 返回
    /// 返回移动后的位置
    pub fn navigate(&mut self, delta: isize) -> usize {
        if self.phase != ExamPhase::InProgress || self.questions.is_empty() {
            return self.current_index;
        }

        let last = self.questions.len() - 1;
        self.current_index = self.current_index.saturating_add_signed(delta).min(last);
        self.current_index
    }

    /// 倒计时走一秒，归零时自动交卷
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != ExamPhase::InProgress {
            return TickOutcome::Ignored;
        }

        self.seconds_remaining = self.seconds_remaining.saturating_sub(1);
        if self.seconds_remaining > 0 {
            return TickOutcome::Running(self.seconds_remaining);
        }

        info!("⏰ 考试时间到，自动交卷");
        TickOutcome::Expired(self.finish())
    }

    /// 交卷
    ///
    /// 已交卷时重复调用返回同一份成绩
    pub fn submit(&mut self) -> AppResult<ExamResult> {
        match self.phase {
            ExamPhase::InProgress => Ok(self.finish()),
            ExamPhase::Submitted => match &self.result {
                Some(result) => Ok(result.clone()),
                None => Ok(self.finish()),
            },
            phase => Err(BusinessError::InvalidPhase {
                operation: "submit",
                phase,
            }
            .into()),
        }
    }

    /// 放弃考试，丢弃所有作答，不产生成绩
    pub fn cancel(&mut self) -> AppResult<()> {
        match self.phase {
            ExamPhase::Loading | ExamPhase::InProgress => {
                info!("🚪 退出考试");
                self.phase = ExamPhase::Cancelled;
                self.answers.clear();
                Ok(())
            }
            phase => Err(BusinessError::InvalidPhase {
                operation: "cancel",
                phase,
            }
            .into()),
        }
    }

    fn finish(&mut self) -> ExamResult {
        let result = ExamResult::compute(&self.questions, &self.answers);
        info!(
            "✅ 交卷: 正确 {}/{}，得分 {}",
            result.correct_answers, result.total_questions, result.score
        );
        self.phase = ExamPhase::Submitted;
        self.result = Some(result.clone());
        result
    }

    fn expect_phase(&self, expected: ExamPhase, operation: &'static str) -> AppResult<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(BusinessError::InvalidPhase {
                operation,
                phase: self.phase,
            }
            .into())
        }
    }

    // ========== 查询 ==========

    pub fn phase(&self) -> ExamPhase {
        self.phase
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        if self.phase == ExamPhase::InProgress {
            self.questions.get(self.current_index)
        } else {
            None
        }
    }

    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 >= self.questions.len()
    }

    pub fn answer_for(&self, question_id: &str) -> Option<bool> {
        self.answers.get(question_id).copied()
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.seconds_remaining
    }

    pub fn result(&self) -> Option<&ExamResult> {
        self.result.as_ref()
    }
}
