//! 兜底数据
//!
//! LLM 调用失败时替换为固定内容，保证调用方永远拿到非空结果

use crate::models::{Question, QuestionKind};

/// LLM 正常返回但内容为空时的学习资料
pub const STUDY_MATERIAL_EMPTY: &str = "无法生成该主题的内容，请稍后再试。";

/// LLM 调用失败时的学习资料
pub const STUDY_MATERIAL_FAILED: &str = "获取学习资料失败，请检查网络设置。";

/// 固定的两道兜底题（一道理论题，一道视频情境题）
pub fn fallback_questions() -> Vec<Question> {
    vec![
        Question {
            id: "fallback-1".to_string(),
            kind: QuestionKind::Theory,
            content: "在第四节比赛还剩0.3秒时，A1获得掷球入界权。\
                      A1将球掷向篮筐，球触及篮圈后反弹，B1在空中接住球并投篮命中。\
                      裁判员判得分有效。这个判罚正确吗？"
                .to_string(),
            media_hint: None,
            correct_answer: false,
            explanation: "错误。根据FIBA规则，如果比赛计时钟显示0.3秒（或更少），\
                          球员获得控球后不能在空中接球再投篮，\
                          只能以拍击（点拨）或直接扣篮的方式得分。\
                          B1接住球后再投篮需要的时间超过0.3秒，得分无效。"
                .to_string(),
        },
        Question {
            id: "fallback-2".to_string(),
            kind: QuestionKind::Video,
            content: "场景描述：A1运球结束，此时左脚为中枢脚。\
                      A1跳起左脚，右脚落地，随后左脚落地（双脚分先后落地），\
                      并在双脚离地前进行了投篮。裁判员判罚A1走步违例。这个判罚正确吗？"
                .to_string(),
            media_hint: None,
            correct_answer: false,
            explanation: "错误。中枢脚离地后，只要在中枢脚再次落地之前球已离手（投篮或传球），\
                          就是合法动作。本场景中A1在双脚离地前完成投篮，不构成带球走违例。"
                .to_string(),
        },
    ]
}
