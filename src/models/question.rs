use serde::{Deserialize, Serialize};

/// 题目类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QuestionKind {
    /// 理论判断题
    Theory,
    /// 视频情境题（描述模拟的比赛场景）
    Video,
}

impl QuestionKind {
    /// 获取显示名称
    pub fn label(self) -> &'static str {
        match self {
            QuestionKind::Theory => "理论判断题",
            QuestionKind::Video => "视频情境题",
        }
    }
}

/// 判断题
///
/// 由生成网关产出，之后不再修改。`id` 只保证在同一套试卷内唯一。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    /// 题目描述或场景描述
    pub content: String,
    /// 视频情境题的示意图地址
    #[serde(
        default,
        alias = "videoPlaceholderUrl",
        skip_serializing_if = "Option::is_none"
    )]
    pub media_hint: Option<String>,
    /// true 代表 "是/正确/合规"
    pub correct_answer: bool,
    /// 规则解析
    pub explanation: String,
}

impl Question {
    pub fn is_video(&self) -> bool {
        self.kind == QuestionKind::Video
    }
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind.label(), self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_uses_type_key() {
        let question = Question {
            id: "q-1".to_string(),
            kind: QuestionKind::Video,
            content: "A1 跳步后投篮".to_string(),
            media_hint: None,
            correct_answer: false,
            explanation: "合法".to_string(),
        };

        let value = serde_json::to_value(&question).unwrap();
        assert_eq!(value["type"], "VIDEO");
        assert_eq!(value["correctAnswer"], false);
        assert!(value.get("mediaHint").is_none());
    }

    #[test]
    fn test_accepts_legacy_placeholder_key() {
        let json = r#"{
            "id": "q-2",
            "type": "VIDEO",
            "content": "场景",
            "videoPlaceholderUrl": "https://picsum.photos/800/450?random=1",
            "correctAnswer": true,
            "explanation": "解析"
        }"#;

        let question: Question = serde_json::from_str(json).unwrap();
        assert_eq!(
            question.media_hint.as_deref(),
            Some("https://picsum.photos/800/450?random=1")
        );
        assert!(question.is_video());
    }
}
