//! ProjectState：会话核心状态与按键路径的读写

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::model::key_path;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON解析失败: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("ZIP处理失败: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("键路径无效: {0}")]
    InvalidPath(String),
    #[error("状态错误: {0}")]
    State(String),
}

/// 单个语言文件：语言标识 + 完整JSON树
///
/// `name` 在项目内唯一且创建后不变；编辑通过整树替换完成。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationFile {
    pub name: String,
    pub data: Value,
}

/// 用户维护的键分组，附带组级上下文与参考键
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default)]
    pub reference_keys: Vec<String>,
}

/// 会话内的整个项目状态
///
/// 显式容器，由调用方按参数传入；键全集在每次结构性变更后整体重算，
/// 不做增量修补。
#[derive(Debug, Default)]
pub struct ProjectState {
    pub files: Vec<TranslationFile>,
    /// 键路径 → 自由文本注释
    pub contexts: BTreeMap<String, String>,
    /// 键路径 → 语言 → 已确认译文
    pub history: BTreeMap<String, BTreeMap<String, String>>,
    pub groups: Vec<Group>,
    pub global_context: String,
    reference_language: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    key_universe: Vec<String>,
}

impl ProjectState {
    /// 加入一个语言文件并重算键全集；语言名重复视为状态错误
    pub fn add_file(&mut self, name: &str, data: Value) -> Result<(), AppError> {
        if self.files.iter().any(|f| f.name == name) {
            return Err(AppError::State(format!("语言文件已存在: {}", name)));
        }
        self.files.push(TranslationFile {
            name: name.to_string(),
            data,
        });
        self.rebuild_universe();
        self.touch();
        tracing::info!("已加载语言文件: {}", name);
        Ok(())
    }

    /// 移除一个语言文件；若它是参考语言，参考语言一并清空
    pub fn remove_file(&mut self, name: &str) -> Result<(), AppError> {
        let before = self.files.len();
        self.files.retain(|f| f.name != name);
        if self.files.len() == before {
            return Err(AppError::State(format!("语言文件不存在: {}", name)));
        }
        if self.reference_language.as_deref() == Some(name) {
            self.reference_language = None;
        }
        self.rebuild_universe();
        self.touch();
        Ok(())
    }

    pub fn file(&self, name: &str) -> Option<&TranslationFile> {
        self.files.iter().find(|f| f.name == name)
    }

    /// 读取某语言在某键路径下的值；缺失返回 `Ok(None)`
    pub fn value_of(&self, lang: &str, path: &str) -> Result<Option<&Value>, AppError> {
        match self.file(lang) {
            Some(file) => key_path::get(&file.data, path),
            None => Ok(None),
        }
    }

    /// 写入某语言在某键路径下的值
    ///
    /// 通过写时复制产生新树后整体替换该文件的 `data`，同级键不受影响；
    /// 随后重算键全集（写入可能新建路径）。
    pub fn set_value(&mut self, lang: &str, path: &str, value: Value) -> Result<(), AppError> {
        let file = self
            .files
            .iter_mut()
            .find(|f| f.name == lang)
            .ok_or_else(|| AppError::State(format!("语言文件不存在: {}", lang)))?;
        file.data = key_path::set(&file.data, path, value)?;
        self.rebuild_universe();
        self.touch();
        tracing::info!("已更新 {} 的键 {}", lang, path);
        Ok(())
    }

    /// 当前键全集（全部文件叶子路径的并集，升序）
    pub fn key_universe(&self) -> &[String] {
        &self.key_universe
    }

    /// 整体重算键全集
    pub fn rebuild_universe(&mut self) {
        self.key_universe = key_path::union_keys(&self.files);
    }

    pub fn reference_language(&self) -> Option<&str> {
        self.reference_language.as_deref()
    }

    /// 设定参考语言（源语言）；必须指向已加载的文件
    ///
    /// 显式配置，不从文件名猜测。
    pub fn set_reference_language(&mut self, name: &str) -> Result<(), AppError> {
        if self.file(name).is_none() {
            return Err(AppError::State(format!(
                "参考语言未加载: {}",
                name
            )));
        }
        self.reference_language = Some(name.to_string());
        self.touch();
        Ok(())
    }

    /// 直接恢复参考语言（快照加载用，不做加载校验以外的处理）
    pub(crate) fn restore_reference_language(&mut self, name: Option<String>) {
        self.reference_language = name.filter(|n| self.files.iter().any(|f| &f.name == n));
    }

    /// 清空整个会话
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn touch(&mut self) {
        self.last_updated = Some(Utc::now());
    }
}
