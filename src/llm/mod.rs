//! LLM分析服务边界：提示词构建、聊天补全客户端与批量编排

pub mod batch;
pub mod client;
pub mod prompt;

pub use batch::{analyze_keys, bulk_translate, AnalysisOutcome, BulkOutcome, ChunkFailure};
pub use client::{ChatService, OpenAiClient, ServiceError};
pub use prompt::{LanguageVerdict, Severity};
