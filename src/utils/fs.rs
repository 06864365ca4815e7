//! IO helper: safe file read/write for JSON and plain text

use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use serde_json::Value;

use crate::model::project::AppError;

/// 从文件读取JSON数据
pub fn read_json_file(p: &Path) -> Result<Value, AppError> {
    let f = File::open(p)?;
    let rdr = BufReader::new(f);
    let v: Value = serde_json::from_reader(rdr)?;
    Ok(v)
}

/// 将JSON数据保存到文件（格式化输出）
pub fn write_json_file(p: &Path, value: &Value) -> Result<(), AppError> {
    let f = File::create(p)?;
    serde_json::to_writer_pretty(f, value)?;
    Ok(())
}

/// 读取纯文本文件（global_context.txt 等）
pub fn read_text_file(p: &Path) -> Result<String, AppError> {
    let mut s = String::new();
    BufReader::new(File::open(p)?).read_to_string(&mut s)?;
    Ok(s)
}

/// 写入纯文本文件
pub fn write_text_file(p: &Path, text: &str) -> Result<(), AppError> {
    std::fs::write(p, text)?;
    Ok(())
}
