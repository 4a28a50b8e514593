use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use futures::FutureExt;
use referee_trainer::clients::{CompletionBackend, CompletionRequest, OutputShape};
use referee_trainer::error::LlmError;
use referee_trainer::services::fallback::STUDY_MATERIAL_FAILED;
use referee_trainer::workflow::{ExamCommand, ExamFlow, ExamOutcome, ExamUpdate};
use referee_trainer::{
    Config, FileSlotStorage, GenerationGateway, MemorySlotStorage, OfflineBackend, QuestionKind,
    TopicStore,
};
use tokio::sync::mpsc;

const EXAM_PAYLOAD: &str = r#"```json
[
  {
    "content": "A1在合理冲撞区内与B1发生接触，判B1阻挡犯规。",
    "type": "THEORY",
    "correctAnswer": true,
    "explanation": "第33.10条"
  },
  {
    "content": "A1运球结束后双脚先后落地再投篮，判带球走。",
    "type": "VIDEO",
    "correctAnswer": false,
    "explanation": "第25条"
  },
  {
    "content": "队员受伤后30秒内无法继续比赛必须被替换。",
    "type": "THEORY",
    "correctAnswer": true,
    "explanation": "第5条"
  }
]
```"#;

/// 文本请求返回讲解，JSON 请求返回考题，并记录所有请求
struct ScriptedBackend {
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedBackend {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
        })
    }
}

impl CompletionBackend for ScriptedBackend {
    fn model_name(&self) -> &str {
        "scripted"
    }

    fn complete<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> BoxFuture<'a, Result<String, LlmError>> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = match request.output {
            OutputShape::Json(_) => EXAM_PAYLOAD.to_string(),
            OutputShape::Text => "## 核心考点\n- 合法防守位置".to_string(),
        };
        async move { Ok(reply) }.boxed()
    }
}

fn test_config() -> Config {
    Config {
        llm_timeout_secs: 0,
        exam_duration_secs: 600,
        ..Config::default()
    }
}

#[tokio::test]
async fn test_custom_topic_survives_restart_and_drives_study_prompt() {
    let dir = std::env::temp_dir().join(format!("ref7-it-{}", std::process::id()));
    let backend = ScriptedBackend::new();
    let gateway = GenerationGateway::new(backend.clone(), &test_config());

    let created = {
        let mut store = TopicStore::open(FileSlotStorage::new(&dir));
        store.create("合法防守位置", "防守队员面对对手，双脚着地").unwrap()
    };

    // 重新打开，模拟程序重启
    let store = TopicStore::open(FileSlotStorage::new(&dir));
    let topic = store.get(&created.id).unwrap();
    assert_eq!(topic, &created);

    let material = gateway.generate_study_material(topic).await;

    assert!(material.contains("核心考点"));
    let requests = backend.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].prompt.contains("防守队员面对对手，双脚着地"));
    assert_eq!(requests[0].output, OutputShape::Text);

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test(start_paused = true)]
async fn test_full_exam_with_scripted_backend() {
    let config = test_config();
    let gateway = Arc::new(GenerationGateway::new(ScriptedBackend::new(), &config));
    let flow = ExamFlow::new(gateway, &config);

    let (tx, mut rx) = mpsc::channel(16);
    for command in [
        ExamCommand::Answer(true),
        ExamCommand::Navigate(1),
        ExamCommand::Answer(true),
        ExamCommand::Navigate(1),
        ExamCommand::Answer(true),
        ExamCommand::Navigate(1),
        ExamCommand::Submit,
    ] {
        tx.send(command).await.unwrap();
    }

    let mut positions = Vec::new();
    let outcome = flow
        .run(3, &mut rx, |update| {
            if let ExamUpdate::Question(session) = update {
                positions.push(session.current_index());
            }
        })
        .await
        .unwrap();

    // 初始显示 + 三次作答 + 三次翻页（最后一次停在末题）
    assert_eq!(positions, vec![0, 0, 1, 1, 2, 2, 2]);

    let ExamOutcome::Completed(result) = outcome else {
        panic!("应该正常交卷");
    };
    assert_eq!(result.total_questions, 3);
    assert_eq!(result.correct_answers, 2);
    assert_eq!(result.score, 67);
    assert_eq!(result.wrong_questions.len(), 1);
    assert_eq!(result.wrong_questions[0].kind, QuestionKind::Video);
    assert!(result.wrong_questions[0].media_hint.is_some());
}

#[tokio::test]
async fn test_offline_gateway_never_errors() {
    let gateway = GenerationGateway::new(Arc::new(OfflineBackend), &test_config());
    let store = TopicStore::open(MemorySlotStorage::new());
    assert!(store.list().is_empty());

    let questions = gateway.generate_exam_questions(10).await;
    let topic = &referee_trainer::models::system_topics()[0];
    let material = gateway.generate_study_material(topic).await;

    assert_eq!(questions.len(), 2);
    assert_eq!(material, STUDY_MATERIAL_FAILED);
}

#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored（需配置 LLM_API_KEY）
async fn test_generate_exam_with_real_llm() {
    let config = Config::load().expect("加载配置失败");
    let gateway = GenerationGateway::from_config(&config);

    let questions = gateway.generate_exam_questions(5).await;

    assert!(!questions.is_empty());
    for question in &questions {
        println!("{}", question);
    }
}
