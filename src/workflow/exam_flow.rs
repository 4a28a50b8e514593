//! 考试流程 - 流程层
//!
//! 核心职责：驱动一场考试从加载到出分
//!
//! 流程顺序：
//! 1. 通过生成网关加载题目（加载中可退出）
//! 2. 启动倒计时
//! 3. 在同一个循环里依次处理用户指令与倒计时 tick
//! 4. 交卷或超时返回成绩，退出时不产生成绩

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppResult, BusinessError};
use crate::models::ExamResult;
use crate::services::GenerationGateway;
use crate::workflow::countdown::Countdown;
use crate::workflow::exam_session::{ExamSession, TickOutcome};

/// 用户在答题界面的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExamCommand {
    /// 为当前题目作答
    Answer(bool),
    /// 前后翻题
    Navigate(isize),
    Submit,
    Cancel,
}

/// 推送给界面的状态变化
#[derive(Debug)]
pub enum ExamUpdate<'a> {
    /// 正在出题
    Loading { count: usize },
    /// 题目或作答发生变化，需要重绘当前题
    Question(&'a ExamSession),
    /// 倒计时走了一秒
    Tick { remaining: u32 },
}

/// 一场考试的结局
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExamOutcome {
    /// 交卷或超时，附成绩
    Completed(ExamResult),
    /// 中途退出
    Cancelled,
}

/// 考试流程
///
/// - 决定何时出题、何时计时、何时出分
/// - 会话状态只在 `run` 内部存在，不与其他任务共享
/// - 同一时间只允许一场考试处于加载阶段
pub struct ExamFlow {
    gateway: Arc<GenerationGateway>,
    duration_secs: u32,
    tick_period: Duration,
    loading: AtomicBool,
}

impl ExamFlow {
    pub fn new(gateway: Arc<GenerationGateway>, config: &Config) -> Self {
        Self {
            gateway,
            duration_secs: config.exam_duration_secs,
            tick_period: Duration::from_secs(1),
            loading: AtomicBool::new(false),
        }
    }

    /// 覆盖考试时长（秒）
    pub fn with_duration(mut self, duration_secs: u32) -> Self {
        self.duration_secs = duration_secs;
        self
    }

    /// 运行一场考试
    ///
    /// # 参数
    /// - `count`: 请求的题目数量，必须为正数
    /// - `commands`: 用户指令；通道关闭视为退出
    /// - `observe`: 每次状态变化时回调，用于界面渲染
    ///
    /// # 返回
    /// 返回考试结局；题量为 0 或已有考试在加载时返回业务错误
    pub async fn run<F>(
        &self,
        count: usize,
        commands: &mut mpsc::Receiver<ExamCommand>,
        mut observe: F,
    ) -> AppResult<ExamOutcome>
    where
        F: FnMut(ExamUpdate<'_>),
    {
        if count == 0 {
            return Err(BusinessError::InvalidQuestionCount.into());
        }
        if self.loading.swap(true, Ordering::SeqCst) {
            warn!("已有考试正在加载，拒绝重复开始");
            return Err(BusinessError::SessionBusy.into());
        }

        let mut session = ExamSession::new();
        let questions = {
            let _loading = LoadingGuard(&self.loading);
            observe(ExamUpdate::Loading { count });

            // 出题结果优先，已到达的题目不会因同时到达的指令被丢弃
            tokio::select! {
                biased;
                questions = self.gateway.generate_exam_questions(count) => questions,
                _ = wait_for_cancel(commands) => {
                    info!("加载中退出考试，放弃本次出题");
                    session.cancel()?;
                    return Ok(ExamOutcome::Cancelled);
                }
            }
        };

        session.begin(questions, self.duration_secs)?;

        let (tick_tx, mut ticks) = mpsc::channel(8);
        let countdown = Countdown::start(self.tick_period, tick_tx);
        observe(ExamUpdate::Question(&session));

        let outcome = loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(ExamCommand::Answer(answer)) => {
                        if let Err(e) = session.answer_current(answer) {
                            warn!("作答被拒绝: {}", e);
                        }
                        observe(ExamUpdate::Question(&session));
                    }
                    Some(ExamCommand::Navigate(delta)) => {
                        session.navigate(delta);
                        observe(ExamUpdate::Question(&session));
                    }
                    Some(ExamCommand::Submit) => {
                        break ExamOutcome::Completed(session.submit()?);
                    }
                    Some(ExamCommand::Cancel) | None => {
                        session.cancel()?;
                        break ExamOutcome::Cancelled;
                    }
                },
                Some(()) = ticks.recv() => match session.tick() {
                    TickOutcome::Running(remaining) => observe(ExamUpdate::Tick { remaining }),
                    TickOutcome::Expired(result) => break ExamOutcome::Completed(result),
                    TickOutcome::Ignored => {}
                },
            }
        };

        countdown.stop();
        Ok(outcome)
    }
}

/// 加载阶段结束（包括提前返回）时释放占用标记
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// 等待退出指令；加载阶段的其他指令没有意义，直接丢弃
async fn wait_for_cancel(commands: &mut mpsc::Receiver<ExamCommand>) {
    loop {
        match commands.recv().await {
            Some(ExamCommand::Cancel) | None => return,
            Some(other) => debug!("加载中忽略指令: {:?}", other),
        }
    }
}
