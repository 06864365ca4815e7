//! 项目导出：打包为ZIP，语言文件格式化输出，随行文件仅在非空时写入

use std::io::{Seek, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::io::import::{CONTEXT_FILE, GLOBAL_CONTEXT_FILE, GROUPS_FILE, HISTORY_FILE};
use crate::model::project::{AppError, ProjectState};

/// 把项目状态写成一个ZIP归档
///
/// 每个语言文件输出为 `<name>.json`（pretty格式）；context/history/
/// groups/global_context 只在有内容时打包。
pub fn export_zip<W: Write + Seek>(state: &ProjectState, writer: W) -> Result<(), AppError> {
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for file in &state.files {
        zip.start_file(format!("{}.json", file.name), options)?;
        zip.write_all(serde_json::to_string_pretty(&file.data)?.as_bytes())?;
    }
    if !state.contexts.is_empty() {
        zip.start_file(CONTEXT_FILE, options)?;
        zip.write_all(serde_json::to_string_pretty(&state.contexts)?.as_bytes())?;
    }
    if !state.history.is_empty() {
        zip.start_file(HISTORY_FILE, options)?;
        zip.write_all(serde_json::to_string_pretty(&state.history)?.as_bytes())?;
    }
    if !state.groups.is_empty() {
        zip.start_file(GROUPS_FILE, options)?;
        zip.write_all(serde_json::to_string_pretty(&state.groups)?.as_bytes())?;
    }
    if !state.global_context.is_empty() {
        zip.start_file(GLOBAL_CONTEXT_FILE, options)?;
        zip.write_all(state.global_context.as_bytes())?;
    }

    zip.finish()?;
    tracing::info!("已导出 {} 个语言文件", state.files.len());
    Ok(())
}

/// 导出到ZIP文件
pub fn export_zip_file(state: &ProjectState, path: &Path) -> Result<(), AppError> {
    export_zip(state, std::fs::File::create(path)?)
}
