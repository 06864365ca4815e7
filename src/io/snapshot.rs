//! 会话快照：整块序列化、整块恢复，没有增量持久化

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::project::{AppError, Group, ProjectState, TranslationFile};
use crate::utils::fs::{read_text_file, write_text_file};

/// 固定的快照文件名（"唯一存储键"）
pub const SNAPSHOT_FILE: &str = "fanyi_guanli_session.json";

/// 会话的完整序列化形态
#[derive(Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub files: Vec<TranslationFile>,
    #[serde(default)]
    pub contexts: BTreeMap<String, String>,
    #[serde(default)]
    pub history: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub global_context: String,
    #[serde(default)]
    pub reference_language: Option<String>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// 从当前状态截取快照
    pub fn capture(state: &ProjectState) -> Self {
        Self {
            files: state.files.clone(),
            contexts: state.contexts.clone(),
            history: state.history.clone(),
            groups: state.groups.clone(),
            global_context: state.global_context.clone(),
            reference_language: state.reference_language().map(String::from),
            last_updated: state.last_updated,
        }
    }

    /// 用快照整体替换内存状态，键全集重新计算
    pub fn restore(self) -> ProjectState {
        let mut state = ProjectState::default();
        state.files = self.files;
        state.contexts = self.contexts;
        state.history = self.history;
        state.groups = self.groups;
        state.global_context = self.global_context;
        state.last_updated = self.last_updated;
        state.rebuild_universe();
        state.restore_reference_language(self.reference_language);
        state
    }
}

/// 保存快照（整体覆盖已有文件）
pub fn save_snapshot(path: &Path, state: &ProjectState) -> Result<(), AppError> {
    let snapshot = Snapshot::capture(state);
    write_text_file(path, &serde_json::to_string_pretty(&snapshot)?)?;
    tracing::info!("会话快照已保存到: {}", path.display());
    Ok(())
}

/// 加载快照并替换整个内存状态
pub fn load_snapshot(path: &Path) -> Result<ProjectState, AppError> {
    let text = read_text_file(path)?;
    let snapshot: Snapshot = serde_json::from_str(&text)?;
    Ok(snapshot.restore())
}
