//! 终端界面 - 编排层
//!
//! 在首页、学习、考试、成绩四个视图之间切换；
//! 只通过 `Question`、`ExamResult`、`StudyTopic` 与其他组件交互

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::FileSlotStorage;
use crate::models::{load_material_file, system_topics, ExamResult, StudyTopic};
use crate::services::{GenerationGateway, TopicStore};
use crate::utils::logging::{format_countdown, log_startup};
use crate::workflow::{ExamCommand, ExamFlow, ExamOutcome, ExamSession, ExamUpdate};

/// 当前视图
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Home,
    Study,
    Exam,
    Results,
}

/// 首页指令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomeCommand {
    Study,
    Exam,
    Quit,
}

/// 学习视图指令（编号从 1 开始，与列表显示一致）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudyCommand {
    Open(usize),
    Create { title: String, content: String },
    Import(String),
    Delete(usize),
    Back,
}

/// 成绩视图指令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsCommand {
    Retry,
    Home,
}

/// 应用主结构
pub struct App {
    config: Config,
    gateway: Arc<GenerationGateway>,
    topics: TopicStore<FileSlotStorage>,
    exam_flow: ExamFlow,
    view: ViewState,
    active_topic: Option<String>,
    last_result: Option<ExamResult>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let gateway = Arc::new(GenerationGateway::from_config(&config));
        let storage = FileSlotStorage::new(&config.data_dir);
        info!("📁 自定义资料目录: {}", storage.dir().display());
        let topics = TopicStore::open(storage);
        let exam_flow = ExamFlow::new(gateway.clone(), &config);

        Ok(Self {
            config,
            gateway,
            topics,
            exam_flow,
            view: ViewState::Home,
            active_topic: None,
            last_result: None,
        })
    }

    /// 运行应用主循环，直到用户退出或输入结束
    pub async fn run(mut self) -> Result<()> {
        let mut input = spawn_input_reader();

        loop {
            let next = match self.view {
                ViewState::Home => self.home(&mut input).await,
                ViewState::Study => self.study(&mut input).await?,
                ViewState::Exam => self.exam(&mut input).await?,
                ViewState::Results => self.results(&mut input).await,
            };

            match next {
                Some(view) => {
                    if view != self.view {
                        info!("视图切换: {:?} → {:?}", self.view, view);
                    }
                    self.view = view;
                }
                None => break,
            }
        }

        info!("👋 程序退出，日志已保存至: {}", self.config.output_log_file);
        Ok(())
    }

    async fn home(&mut self, input: &mut mpsc::Receiver<String>) -> Option<ViewState> {
        println!("\n{}", render_home(&self.config));

        loop {
            let line = input.recv().await?;
            match parse_home(&line) {
                Some(HomeCommand::Study) => return Some(ViewState::Study),
                Some(HomeCommand::Exam) => return Some(ViewState::Exam),
                Some(HomeCommand::Quit) => return None,
                None => println!("请输入 1（学习）、2（考试）或 q（退出）"),
            }
        }
    }

    async fn study(&mut self, input: &mut mpsc::Receiver<String>) -> Result<Option<ViewState>> {
        loop {
            let catalog = self.catalog();
            println!("\n{}", render_catalog(&catalog));

            let Some(line) = input.recv().await else {
                return Ok(None);
            };
            let Some(command) = parse_study(&line) else {
                println!("无法识别的指令: {}", line.trim());
                continue;
            };

            match command {
                StudyCommand::Back => return Ok(Some(ViewState::Home)),
                StudyCommand::Open(n) => match catalog.get(n.wrapping_sub(1)) {
                    Some(topic) => {
                        self.open_topic(topic).await;
                    }
                    None => println!("没有编号为 {} 的主题", n),
                },
                StudyCommand::Create { title, content } => {
                    self.save_custom_topic(&title, &content).await;
                }
                StudyCommand::Import(path) => match load_material_file(Path::new(&path)).await {
                    Ok(material) => {
                        self.save_custom_topic(&material.title, &material.content).await;
                    }
                    Err(e) => {
                        warn!("导入资料失败: {:#}", e);
                        println!("❌ 导入失败: {:#}", e);
                    }
                },
                StudyCommand::Delete(n) => {
                    let Some(topic) = catalog.get(n.wrapping_sub(1)).filter(|t| t.is_custom) else {
                        println!("只能删除自定义资料");
                        continue;
                    };

                    println!("确定要删除「{}」吗？(y/n)", topic.title);
                    let Some(answer) = input.recv().await else {
                        return Ok(None);
                    };
                    if !is_confirmation(&answer) {
                        println!("已取消删除");
                        continue;
                    }

                    let outcome = self.topics.delete(&topic.id, self.active_topic.as_deref())?;
                    if outcome.clear_active {
                        self.active_topic = None;
                    }
                    if outcome.removed {
                        println!("🗑️ 已删除: {}", topic.title);
                    }
                }
            }
        }
    }

    /// 查看主题并生成学习资料
    async fn open_topic(&mut self, topic: &StudyTopic) -> String {
        self.active_topic = Some(topic.id.clone());
        println!("\n📖 {} 正在生成学习资料...", topic.title);

        let material = self.gateway.generate_study_material(topic).await;
        println!("\n{}\n", material);
        material
    }

    /// 保存自定义资料，成功后直接打开
    ///
    /// # 返回
    /// 返回新资料的学习内容；保存失败时返回 `None`
    async fn save_custom_topic(&mut self, title: &str, content: &str) -> Option<String> {
        match self.topics.create(title, content) {
            Ok(topic) => {
                println!("✅ 已保存自定义资料: {}", topic.title);
                Some(self.open_topic(&topic).await)
            }
            Err(e) => {
                warn!("保存自定义资料失败: {}", e);
                println!("❌ {}", e);
                None
            }
        }
    }

    /// 系统课程在前，自定义资料在后（最新的在前）
    fn catalog(&self) -> Vec<StudyTopic> {
        let mut catalog = system_topics();
        catalog.extend(self.topics.list().iter().cloned());
        catalog
    }

    async fn exam(&mut self, input: &mut mpsc::Receiver<String>) -> Result<Option<ViewState>> {
        let count = self.config.exam_question_count;
        let outcome = drive_exam(&self.exam_flow, count, input, render_update).await;

        match outcome {
            Ok(ExamOutcome::Completed(result)) => {
                self.last_result = Some(result);
                Ok(Some(ViewState::Results))
            }
            Ok(ExamOutcome::Cancelled) => {
                println!("已退出考试");
                Ok(Some(ViewState::Home))
            }
            Err(e) => {
                error!("考试无法开始: {}", e);
                println!("❌ {}", e);
                Ok(Some(ViewState::Home))
            }
        }
    }

    async fn results(&mut self, input: &mut mpsc::Receiver<String>) -> Option<ViewState> {
        match &self.last_result {
            Some(result) => println!("\n{}", render_result(result)),
            None => return Some(ViewState::Home),
        }

        loop {
            let line = input.recv().await?;
            match parse_results(&line) {
                Some(ResultsCommand::Retry) => return Some(ViewState::Exam),
                Some(ResultsCommand::Home) => return Some(ViewState::Home),
                None => println!("请输入 r（再考一次）或 h（返回首页）"),
            }
        }
    }
}

/// 把输入行转成考试指令并运行一场考试
///
/// 输入结束时关闭指令通道，流程先处理完已排队的指令再结束
pub async fn drive_exam<F>(
    flow: &ExamFlow,
    count: usize,
    input: &mut mpsc::Receiver<String>,
    observe: F,
) -> AppResult<ExamOutcome>
where
    F: FnMut(ExamUpdate<'_>),
{
    let (tx, mut commands) = mpsc::channel(16);
    let exam = flow.run(count, &mut commands, observe);
    tokio::pin!(exam);

    let forward = async move {
        while let Some(line) = input.recv().await {
            match parse_exam(&line) {
                Some(command) => {
                    if tx.send(command).await.is_err() {
                        break;
                    }
                }
                None => println!("{}", EXAM_HELP),
            }
        }
    };

    let finished = tokio::select! {
        outcome = &mut exam => Some(outcome),
        _ = forward => None,
    };

    match finished {
        Some(outcome) => outcome,
        None => exam.await,
    }
}

/// 后台读取标准输入，逐行发送
fn spawn_input_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(32);

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    error!("读取输入失败: {}", e);
                    break;
                }
            }
        }
    });

    rx
}

// ========== 指令解析 ==========

const EXAM_HELP: &str = "指令: y（是） n（否） p（上一题） x（下一题） s（交卷） q（退出）";

pub fn parse_home(line: &str) -> Option<HomeCommand> {
    match line.trim().to_lowercase().as_str() {
        "1" | "study" | "学习" => Some(HomeCommand::Study),
        "2" | "exam" | "考试" => Some(HomeCommand::Exam),
        "q" | "quit" | "退出" => Some(HomeCommand::Quit),
        _ => None,
    }
}

/// 解析学习视图指令
///
/// - `<编号>`：查看主题
/// - `new 标题|内容`：新建自定义资料
/// - `import <路径>`：从文本文件导入
/// - `del <编号>`：删除自定义资料
/// - `b` / `back`：返回首页
pub fn parse_study(line: &str) -> Option<StudyCommand> {
    let line = line.trim();
    if let Ok(n) = line.parse::<usize>() {
        return Some(StudyCommand::Open(n));
    }

    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim_start();

    match verb {
        "b" | "back" | "返回" => Some(StudyCommand::Back),
        "new" | "新建" => {
            let (title, content) = rest.split_once('|')?;
            Some(StudyCommand::Create {
                title: title.to_string(),
                content: content.replace("\\n", "\n"),
            })
        }
        "import" | "导入" if !rest.is_empty() => Some(StudyCommand::Import(rest.to_string())),
        "del" | "删除" => rest.trim().parse().ok().map(StudyCommand::Delete),
        _ => None,
    }
}

pub fn parse_exam(line: &str) -> Option<ExamCommand> {
    match line.trim().to_lowercase().as_str() {
        "y" | "yes" | "是" => Some(ExamCommand::Answer(true)),
        "n" | "no" | "否" => Some(ExamCommand::Answer(false)),
        "p" | "prev" | "上一题" => Some(ExamCommand::Navigate(-1)),
        "x" | "next" | "下一题" => Some(ExamCommand::Navigate(1)),
        "s" | "submit" | "交卷" => Some(ExamCommand::Submit),
        "q" | "quit" | "退出" => Some(ExamCommand::Cancel),
        _ => None,
    }
}

pub fn parse_results(line: &str) -> Option<ResultsCommand> {
    match line.trim().to_lowercase().as_str() {
        "r" | "retry" | "再考一次" => Some(ResultsCommand::Retry),
        "h" | "home" | "" | "首页" => Some(ResultsCommand::Home),
        _ => None,
    }
}

/// 只有明确的 y / yes / 是 才算确认
pub fn is_confirmation(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "y" | "yes" | "是")
}

// ========== 渲染 ==========

fn render_home(config: &Config) -> String {
    format!(
        "{bar}\n🏀 篮球裁判员学习与考试\n{bar}\n\
         1. 学习中心（规则课程与自定义资料）\n\
         2. 模拟考试（{count} 道判断题，限时 {time}）\n\
         q. 退出",
        bar = "=".repeat(40),
        count = config.exam_question_count,
        time = format_countdown(config.exam_duration_secs),
    )
}

pub fn render_catalog(catalog: &[StudyTopic]) -> String {
    let mut out = format!("{}\n📚 学习中心\n{}\n", "=".repeat(40), "=".repeat(40));

    for (i, topic) in catalog.iter().enumerate() {
        let tag = match topic.created_date() {
            Some(date) if topic.is_custom => format!(" [自定义 {}]", date),
            _ if topic.is_custom => " [自定义]".to_string(),
            _ => String::new(),
        };
        out.push_str(&format!("{:>2}. {}{}\n    {}\n", i + 1, topic.title, tag, topic.description));
    }

    out.push_str("指令: <编号> 查看 | new 标题|内容 | import <路径> | del <编号> | b 返回");
    out
}

pub fn render_question(session: &ExamSession) -> String {
    let Some(question) = session.current_question() else {
        return "本场考试没有题目，输入 s 交卷".to_string();
    };

    let answer = match session.answer_for(&question.id) {
        Some(true) => "是",
        Some(false) => "否",
        None => "未作答",
    };

    let mut out = format!(
        "\n第 {}/{} 题 [{}]  已答 {}  剩余 {}\n",
        session.current_index() + 1,
        session.questions().len(),
        question.kind.label(),
        session.answered_count(),
        format_countdown(session.seconds_remaining()),
    );
    if question.is_video() {
        let hint = question.media_hint.as_deref().unwrap_or("（无示意图）");
        out.push_str(&format!("🎬 情境示意: {}\n", hint));
    }
    out.push_str(&format!("{}\n当前作答: {}\n{}", question.content, answer, EXAM_HELP));
    if session.is_last_question() {
        out.push_str("\n（已是最后一题）");
    }
    out
}

/// 整分钟与最后十秒提示剩余时间
pub fn should_announce(remaining: u32) -> bool {
    remaining % 60 == 0 || remaining <= 10
}

fn render_update(update: ExamUpdate<'_>) {
    match update {
        ExamUpdate::Loading { count } => {
            println!("\n🤖 正在生成 {} 道考题，请稍候（q 退出）...", count);
        }
        ExamUpdate::Question(session) => println!("{}", render_question(session)),
        ExamUpdate::Tick { remaining } if should_announce(remaining) => {
            println!("⏱️ 剩余时间 {}", format_countdown(remaining));
        }
        ExamUpdate::Tick { .. } => {}
    }
}

/// 达到及格线时的提示
pub const PASS_MESSAGE: &str = "恭喜！您已达到国家级裁判及格标准。";

/// 未达到及格线时的提示
pub const FAIL_MESSAGE: &str = "还需努力，请查阅错题解析。";

pub fn render_result(result: &ExamResult) -> String {
    let mut out = format!(
        "{bar}\n📊 考试结果\n{bar}\n得分: {}\n正确: {}/{}\n",
        result.score,
        result.correct_answers,
        result.total_questions,
        bar = "=".repeat(40),
    );

    if result.is_passed() {
        out.push_str(&format!("{}\n", PASS_MESSAGE));
    } else {
        out.push_str(&format!("{}\n", FAIL_MESSAGE));
    }

    if result.is_perfect() {
        out.push_str("🎉 全部正确！\n");
    } else {
        out.push_str("\n错题回顾:\n");
        for (i, question) in result.wrong_questions.iter().enumerate() {
            out.push_str(&format!(
                "{}. [{}] {}\n   正确答案: {}\n   解析: {}\n",
                i + 1,
                question.kind.label(),
                question.content,
                if question.correct_answer { "是" } else { "否" },
                question.explanation,
            ));
        }
    }

    out.push_str("r 再考一次 | h 返回首页");
    out
}
