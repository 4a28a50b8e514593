//! # Referee Trainer
//!
//! 篮球裁判员学习与考试工具（终端版）
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持久化能力，只暴露按槽位读写
//! - `SlotStorage` - `FileSlotStorage`（落盘）/ `MemorySlotStorage`（测试）
//! - `clients/` - 外部文本生成能力（`LlmClient` / `OfflineBackend`）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `GenerationGateway` - 出题与生成学习资料，失败时返回兜底内容
//! - `TopicStore` - 自定义学习资料的新建、列出、删除
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一场考试"的完整流程
//! - `ExamSession` - 状态机（加载 → 答题 → 交卷 / 退出）
//! - `ExamFlow` - 流程编排（出题 → 倒计时 → 作答 → 出分）
//!
//! ### ④ 编排层（App）
//! - `app` - 终端视图路由（首页 / 学习 / 考试 / 成绩）
//!
//! ## 模块结构

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use clients::{CompletionBackend, CompletionRequest, LlmClient, OfflineBackend, OutputShape};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{FileSlotStorage, MemorySlotStorage, SlotStorage};
pub use models::{ExamResult, Question, QuestionKind, StudyTopic};
pub use services::{GenerationGateway, TopicStore};
pub use workflow::{ExamCommand, ExamFlow, ExamOutcome, ExamPhase, ExamSession, ExamUpdate};
