//! 提示词构建
//!
//! 只负责把主题、题量等信息拼成 LLM 指令，不发请求

use serde_json::{json, Value};

use crate::models::StudyTopic;

/// 理论题占比（百分比），其余为视频情境题
pub const THEORY_PERCENT: u32 = 70;

/// VIDEO 题的出题要求
const VIDEO_RULE: &str = "对于 VIDEO 类型的题目，在 'content' 字段中详细描述一个具体的比赛场景\
                          （例如：A1持球突破，B1在合理冲撞区内建立防守位置...），\
                          让考生判断判罚是否正确。";

/// 出题时的系统消息
pub const EXAM_SYSTEM_MESSAGE: &str =
    "你是一名FIBA国际篮联规则专家，也是中国国家级篮球裁判员培训师。";

/// 讲解资料时的系统消息
pub const STUDY_SYSTEM_MESSAGE: &str = "你是一位资深的国家级篮球裁判讲师。";

/// 构建出题指令
pub fn build_exam_prompt(count: usize, language: &str) -> String {
    format!(
        r#"请生成 {count} 道用于裁判理论考试的判断题 (Yes/No Question)。

要求：
1. 题目难度要符合国家级裁判员考试标准（较高难度）。
2. 包含大约 {theory}% 的纯理论文字题 (THEORY) 和 {video}% 的视频情境模拟题 (VIDEO)。
3. {video_rule}
4. 输出必须是{language}。
5. 返回严格的 JSON 数组，每个元素包含：
   - content: 题目描述或场景描述
   - type: "THEORY" 或 "VIDEO"
   - correctAnswer: true 代表 "是/正确/合规"，false 代表 "否/错误/违例/犯规"
   - explanation: 详细的规则解析，引用FIBA规则条款"#,
        count = count,
        theory = THEORY_PERCENT,
        video = 100 - THEORY_PERCENT,
        video_rule = VIDEO_RULE,
        language = language,
    )
}

/// 出题结果的 JSON Schema
pub fn exam_schema() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "content": { "type": "string" },
                "type": { "type": "string", "enum": ["THEORY", "VIDEO"] },
                "correctAnswer": { "type": "boolean" },
                "explanation": { "type": "string" }
            },
            "required": ["content", "type", "correctAnswer", "explanation"]
        }
    })
}

/// 构建学习资料指令
///
/// 自定义资料：整理用户原文、提炼考点、补充规则并出自测题；
/// 系统课程：按主题生成复习资料。
pub fn build_study_prompt(topic: &StudyTopic, language: &str) -> String {
    match topic.custom_content() {
        Some(user_content) => format!(
            r#"用户提供了一份关于 "{title}" 的学习资料原文。

请你完成以下任务：
1. 整理并优化这份资料的格式（使用Markdown），使其更易于阅读。
2. 提炼出其中的【核心考点】和【判罚关键】。
3. 如果资料中涉及规则，请补充相关的FIBA规则解释或判例（如果原文未提及）。
4. 针对这份资料，出1-2道自测思考题（附带答案）。

请使用{language}输出。

用户资料原文如下：
"""
{content}
""""#,
            title = topic.title,
            language = language,
            content = user_content,
        ),
        None => format!(
            r#"请用专业的语言，为中国国家级篮球裁判员生成关于 "{prompt}" 的复习资料。
包括：
1. 核心规则定义。
2. 常见判罚误区。
3. 判罚原则与技巧（Mechanics）。
请使用{language}和Markdown格式输出。"#,
            prompt = topic.prompt,
            language = language,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::system_topics;

    #[test]
    fn test_exam_prompt_mentions_count_and_ratio() {
        let prompt = build_exam_prompt(10, "简体中文");

        assert!(prompt.contains("10 道"));
        assert!(prompt.contains("70%"));
        assert!(prompt.contains("30%"));
        assert!(prompt.contains("简体中文"));
    }

    #[test]
    fn test_schema_restricts_kind() {
        let schema = exam_schema();
        assert_eq!(
            schema["items"]["properties"]["type"]["enum"],
            json!(["THEORY", "VIDEO"])
        );
    }

    #[test]
    fn test_custom_topic_embeds_user_content() {
        let topic = StudyTopic::custom(
            "custom-1".to_string(),
            "我的笔记".to_string(),
            "合法防守位置的建立".to_string(),
            0,
        );

        let prompt = build_study_prompt(&topic, "简体中文");
        assert!(prompt.contains("\"我的笔记\""));
        assert!(prompt.contains("合法防守位置的建立"));
        assert!(prompt.contains("自测思考题"));
    }

    #[test]
    fn test_system_topic_uses_reference_prompt() {
        let topic = &system_topics()[2];

        let prompt = build_study_prompt(topic, "简体中文");
        assert!(prompt.contains("FIBA规则第33条：接触的一般原则"));
        assert!(prompt.contains("常见判罚误区"));
    }
}
