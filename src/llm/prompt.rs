//! 提示词构建与结构化响应解析

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::llm::client::ServiceError;

/// 评估严重度，固定三档
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Ok,
    Warning,
    Error,
}

/// 单个语言的评估结论
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageVerdict {
    pub language: String,
    pub severity: Severity,
    pub feedback: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// 单键分析的全部输入素材
#[derive(Debug, Default)]
pub struct AnalysisInput<'a> {
    pub key: &'a str,
    pub reference_language: &'a str,
    pub reference_value: &'a str,
    /// 可选的第二参考语言及其值
    pub secondary_reference: Option<(&'a str, &'a str)>,
    /// 待评估的 (语言, 值) 列表
    pub evaluated: Vec<(String, String)>,
    /// 语言 → 历史已确认译文
    pub history: Option<&'a BTreeMap<String, String>>,
    /// 所属分组的上下文描述
    pub group_context: Option<&'a str>,
    /// 分组参考键的 (键, 参考语言值) 样例
    pub reference_examples: Vec<(String, String)>,
    /// 该键的自由文本注释
    pub key_context: Option<&'a str>,
    pub global_context: Option<&'a str>,
}

pub const ANALYSIS_SYSTEM_PROMPT: &str = "\
你是资深本地化审校。对照参考语言的原文逐一评估各语言的译文。\
只输出一个JSON数组，每个元素形如 \
{\"language\": \"...\", \"severity\": \"ok|warning|error\", \"feedback\": \"...\", \"suggestion\": \"...\"}，\
severity 只允许这三个值，suggestion 在没有更好译法时省略。不要输出数组以外的任何内容。";

pub const BULK_SYSTEM_PROMPT: &str = "\
你是专业翻译。把参考语言的值逐键翻译到目标语言。\
只输出一个JSON对象：键是给出的键路径，值是目标语言的译文字符串。\
不要输出对象以外的任何内容。";

/// 渲染单键分析的用户提示词
pub fn build_analysis_prompt(input: &AnalysisInput<'_>) -> String {
    let mut prompt = String::new();
    if let Some(global) = input.global_context.filter(|s| !s.is_empty()) {
        prompt.push_str(&format!("项目背景：{}\n\n", global));
    }
    if let Some(group) = input.group_context.filter(|s| !s.is_empty()) {
        prompt.push_str(&format!("分组背景：{}\n\n", group));
    }
    if let Some(ctx) = input.key_context.filter(|s| !s.is_empty()) {
        prompt.push_str(&format!("该键的说明：{}\n\n", ctx));
    }

    prompt.push_str(&format!("键路径：{}\n", input.key));
    prompt.push_str(&format!(
        "参考语言 {}：{:?}\n",
        input.reference_language, input.reference_value
    ));
    if let Some((lang, value)) = &input.secondary_reference {
        prompt.push_str(&format!("第二参考 {}：{:?}\n", lang, value));
    }

    prompt.push_str("\n待评估译文：\n");
    for (lang, value) in &input.evaluated {
        prompt.push_str(&format!("- {}：{:?}\n", lang, value));
    }

    if let Some(history) = input.history.filter(|h| !h.is_empty()) {
        prompt.push_str("\n历史已确认译文（偏离时请说明理由）：\n");
        for (lang, value) in history.iter() {
            prompt.push_str(&format!("- {}：{:?}\n", lang, value));
        }
    }
    if !input.reference_examples.is_empty() {
        prompt.push_str("\n同组参考键（风格与术语基准，权重较高）：\n");
        for (key, value) in &input.reference_examples {
            prompt.push_str(&format!("- {}：{:?}\n", key, value));
        }
    }
    prompt
}

/// 渲染批量翻译的用户提示词；items 为 (键, 参考语言值)
pub fn build_bulk_prompt(
    target_language: &str,
    reference_language: &str,
    items: &[(String, String)],
    global_context: &str,
) -> String {
    let mut prompt = String::new();
    if !global_context.is_empty() {
        prompt.push_str(&format!("项目背景：{}\n\n", global_context));
    }
    prompt.push_str(&format!(
        "把以下 {} 的值翻译为 {}：\n",
        reference_language, target_language
    ));
    for (key, value) in items {
        prompt.push_str(&format!("- \"{}\"：{:?}\n", key, value));
    }
    prompt
}

/// 去掉可能包裹响应的Markdown代码围栏
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // 首行可能带语言标签（```json）
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// 解析单键分析的响应；结构不符一律视为 `MalformedResponse`
pub fn parse_analysis_response(raw: &str) -> Result<Vec<LanguageVerdict>, ServiceError> {
    serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| ServiceError::MalformedResponse(e.to_string()))
}

/// 解析批量翻译的响应：键路径 → 建议译文
pub fn parse_bulk_response(raw: &str) -> Result<BTreeMap<String, String>, ServiceError> {
    serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| ServiceError::MalformedResponse(e.to_string()))
}
