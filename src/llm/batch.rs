//! 批量编排：逐键分析的并发扇出与分块批量翻译
//!
//! 扇出只合流、不协调：请求之间不共享可变数据，单个失败不取消兄弟
//! 请求，也不会触碰已应用的编辑。分块之间用固定延迟串行推进，没有
//! 重试，失败块的键保持未翻译。

use std::collections::BTreeMap;
use std::time::Duration;

use futures::future::join_all;
use serde_json::Value;

use crate::llm::client::{ChatService, ServiceError};
use crate::llm::prompt::{
    build_analysis_prompt, build_bulk_prompt, parse_analysis_response, parse_bulk_response,
    AnalysisInput, LanguageVerdict, ANALYSIS_SYSTEM_PROMPT, BULK_SYSTEM_PROMPT,
};
use crate::model::key_path;
use crate::model::project::{AppError, ProjectState};

pub const DEFAULT_CHUNK_SIZE: usize = 10;
pub const DEFAULT_CHUNK_DELAY: Duration = Duration::from_secs(1);

/// 逐键分析结果：成功与失败分开记录，键为单位
#[derive(Debug, Default)]
pub struct AnalysisOutcome {
    pub verdicts: BTreeMap<String, Vec<LanguageVerdict>>,
    pub failures: BTreeMap<String, ServiceError>,
}

/// 一个失败块：块内全部键 + 失败原因
#[derive(Debug)]
pub struct ChunkFailure {
    pub keys: Vec<String>,
    pub error: ServiceError,
}

/// 批量翻译结果：失败块的键不出现在建议表中
#[derive(Debug, Default)]
pub struct BulkOutcome {
    pub suggestions: BTreeMap<String, String>,
    pub failures: Vec<ChunkFailure>,
}

/// 值的展示形式：字符串取内容，其余类型取JSON文本
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn reference_value(state: &ProjectState, lang: &str, key: &str) -> Result<String, AppError> {
    Ok(state
        .value_of(lang, key)?
        .map(display_value)
        .unwrap_or_default())
}

/// 对一组键做并发分析
///
/// 每个键一次独立请求，`join_all` 等待全部落定；失败按键记录，
/// 不影响其他键。未设定参考语言时直接失败。
pub async fn analyze_keys<S: ChatService + Sync>(
    service: &S,
    state: &ProjectState,
    keys: &[String],
    secondary_reference: Option<&str>,
) -> Result<AnalysisOutcome, AppError> {
    let reference = state
        .reference_language()
        .ok_or_else(|| AppError::State("未设定参考语言".to_string()))?;

    // 提示词全部同步构建，异步部分只剩远程调用
    let mut prompts = Vec::with_capacity(keys.len());
    for key in keys {
        let reference_value_str = reference_value(state, reference, key)?;
        let secondary = match secondary_reference {
            Some(lang) => Some((lang, reference_value(state, lang, key)?)),
            None => None,
        };

        let mut evaluated = Vec::new();
        for file in &state.files {
            if file.name == reference || Some(file.name.as_str()) == secondary_reference {
                continue;
            }
            if let Some(v) = key_path::get(&file.data, key)? {
                evaluated.push((file.name.clone(), display_value(v)));
            }
        }

        let group = state.groups.iter().find(|g| g.keys.contains(key));
        let mut reference_examples = Vec::new();
        if let Some(group) = group {
            for ref_key in &group.reference_keys {
                if ref_key != key {
                    reference_examples
                        .push((ref_key.clone(), reference_value(state, reference, ref_key)?));
                }
            }
        }

        let input = AnalysisInput {
            key: key.as_str(),
            reference_language: reference,
            reference_value: &reference_value_str,
            secondary_reference: secondary
                .as_ref()
                .map(|(lang, value)| (*lang, value.as_str())),
            evaluated,
            history: state.history.get(key),
            group_context: group.map(|g| g.context.as_str()).filter(|c| !c.is_empty()),
            reference_examples,
            key_context: state.contexts.get(key).map(String::as_str),
            global_context: Some(state.global_context.as_str()),
        };
        prompts.push((key.clone(), build_analysis_prompt(&input)));
    }

    let results = join_all(prompts.into_iter().map(|(key, prompt)| async move {
        let outcome = match service.complete(ANALYSIS_SYSTEM_PROMPT, &prompt).await {
            Ok(raw) => parse_analysis_response(&raw),
            Err(e) => Err(e),
        };
        (key, outcome)
    }))
    .await;

    let mut outcome = AnalysisOutcome::default();
    for (key, result) in results {
        match result {
            Ok(verdicts) => {
                outcome.verdicts.insert(key, verdicts);
            }
            Err(e) => {
                tracing::error!("键 {} 分析失败: {}", key, e);
                outcome.failures.insert(key, e);
            }
        }
    }
    Ok(outcome)
}

/// 分块批量翻译到一个目标语言
///
/// 块串行推进，块间固定延迟（只为外部限流，非自适应退避）；失败块
/// 记录后继续下一块，不重试。响应里不属于本块的键一概忽略。
pub async fn bulk_translate<S: ChatService + Sync>(
    service: &S,
    state: &ProjectState,
    target_language: &str,
    keys: &[String],
    chunk_size: usize,
    chunk_delay: Duration,
) -> Result<BulkOutcome, AppError> {
    let reference = state
        .reference_language()
        .ok_or_else(|| AppError::State("未设定参考语言".to_string()))?;

    let mut outcome = BulkOutcome::default();
    for (index, chunk) in keys.chunks(chunk_size.max(1)).enumerate() {
        if index > 0 {
            tokio::time::sleep(chunk_delay).await;
        }

        let mut items = Vec::with_capacity(chunk.len());
        for key in chunk {
            items.push((key.clone(), reference_value(state, reference, key)?));
        }
        let prompt = build_bulk_prompt(target_language, reference, &items, &state.global_context);

        let result = match service.complete(BULK_SYSTEM_PROMPT, &prompt).await {
            Ok(raw) => parse_bulk_response(&raw),
            Err(e) => Err(e),
        };
        match result {
            Ok(map) => {
                for key in chunk {
                    if let Some(suggestion) = map.get(key) {
                        outcome.suggestions.insert(key.clone(), suggestion.clone());
                    }
                }
                tracing::info!("第 {} 块翻译完成（{} 个键）", index + 1, chunk.len());
            }
            Err(e) => {
                tracing::error!("第 {} 块翻译失败: {}", index + 1, e);
                outcome.failures.push(ChunkFailure {
                    keys: chunk.to_vec(),
                    error: e,
                });
            }
        }
    }
    Ok(outcome)
}
