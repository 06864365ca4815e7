//! 导入导出与会话快照

pub mod export;
pub mod import;
pub mod snapshot;
