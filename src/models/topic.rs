use serde::{Deserialize, Serialize};

/// 自定义资料的默认描述
pub const CUSTOM_TOPIC_DESCRIPTION: &str = "用户自定义资料";

/// 学习主题
///
/// 系统课程为固定目录；自定义资料由用户上传，`user_content` 原样保存。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyTopic {
    pub id: String,
    pub title: String,
    pub description: String,
    /// 请求 LLM 生成资料时使用的主题描述
    pub prompt: String,
    #[serde(default)]
    pub is_custom: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_content: Option<String>,
    /// 创建时间（毫秒时间戳）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

impl StudyTopic {
    /// 创建自定义资料
    pub fn custom(id: String, title: String, content: String, created_at: i64) -> Self {
        Self {
            id,
            prompt: title.clone(),
            title,
            description: CUSTOM_TOPIC_DESCRIPTION.to_string(),
            is_custom: true,
            user_content: Some(content),
            created_at: Some(created_at),
        }
    }

    /// 自定义资料且带有原文时返回原文
    pub fn custom_content(&self) -> Option<&str> {
        if self.is_custom {
            self.user_content.as_deref()
        } else {
            None
        }
    }

    /// 创建日期（本地时区，`YYYY-MM-DD`）
    pub fn created_date(&self) -> Option<String> {
        use chrono::TimeZone;

        let millis = self.created_at?;
        chrono::Local
            .timestamp_millis_opt(millis)
            .single()
            .map(|dt| dt.format("%Y-%m-%d").to_string())
    }
}

/// 系统课程目录（固定五个主题）
pub fn system_topics() -> Vec<StudyTopic> {
    const CATALOG: [(&str, &str, &str, &str); 5] = [
        (
            "1",
            "第5条：球员 - 受伤",
            "关于球员受伤时的比赛停止与替换规则",
            "FIBA规则第5条：球员受伤",
        ),
        (
            "2",
            "第25条：带球走",
            "中枢脚的确定、持球移动的合法性",
            "FIBA规则第25条：带球走",
        ),
        (
            "3",
            "第33条：接触 - 一般原则",
            "圆柱体原则、垂直原则、合法防守位置",
            "FIBA规则第33条：接触的一般原则",
        ),
        (
            "4",
            "第37条：违反体育运动精神的犯规",
            "C1-C5类型的判断标准",
            "FIBA规则第37条：违反体育运动精神的犯规 (Unsportsmanlike Foul)",
        ),
        (
            "5",
            "三人裁判法 (3PO)",
            "前导、中央、追踪裁判的移动与责任区域",
            "FIBA三人裁判法基础与责任分工",
        ),
    ];

    CATALOG
        .iter()
        .map(|(id, title, description, prompt)| StudyTopic {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            prompt: prompt.to_string(),
            is_custom: false,
            user_content: None,
            created_at: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_catalog_is_fixed() {
        let topics = system_topics();

        assert_eq!(topics.len(), 5);
        assert!(topics.iter().all(|t| !t.is_custom && t.user_content.is_none()));
        assert_eq!(topics[1].prompt, "FIBA规则第25条：带球走");
    }

    #[test]
    fn test_custom_topic_uses_title_as_prompt() {
        let topic = StudyTopic::custom(
            "custom-1".to_string(),
            "走步笔记".to_string(),
            "中枢脚……".to_string(),
            1_700_000_000_000,
        );

        assert_eq!(topic.prompt, "走步笔记");
        assert_eq!(topic.description, CUSTOM_TOPIC_DESCRIPTION);
        assert_eq!(topic.custom_content(), Some("中枢脚……"));
        assert!(topic.created_date().is_some());
    }

    #[test]
    fn test_reads_camel_case_storage_format() {
        let json = r#"[{
            "id": "custom-1700000000000",
            "title": "笔记",
            "description": "用户自定义资料",
            "prompt": "笔记",
            "isCustom": true,
            "userContent": "原文",
            "createdAt": 1700000000000
        }]"#;

        let topics: Vec<StudyTopic> = serde_json::from_str(json).unwrap();
        assert_eq!(topics[0].created_at, Some(1_700_000_000_000));
        assert_eq!(topics[0].custom_content(), Some("原文"));
    }
}
