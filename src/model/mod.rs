//! 数据模型：会话状态、键路径寻址、行号定位与编辑回填

pub mod edit;
pub mod key_path;
pub mod locate;
pub mod project;
