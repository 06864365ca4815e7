//! JSON翻译管理核心库
//!
//! 提供多语言JSON树的键路径寻址、叶子键全集计算、行号定位、
//! 项目导入导出、会话快照，以及对外部LLM服务的评审与批量翻译编排
//! 核心函数只依赖按参数传入的显式状态容器，不依赖任何全局状态

pub mod io;
pub mod llm;
pub mod model;
pub mod utils;

// 重新导出主要类型
pub use model::key_path::{flatten_leaf_paths, get, set, union_keys};
pub use model::project::{AppError, Group, ProjectState, TranslationFile};
