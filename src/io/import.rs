//! 项目导入：目录或ZIP中的语言文件与随行文件，单文件损坏不拖垮整批

use std::collections::BTreeMap;
use std::io::{Read, Seek};
use std::path::Path;

use serde_json::Value;
use zip::ZipArchive;

use crate::model::project::{AppError, Group, ProjectState};

pub const CONTEXT_FILE: &str = "context.json";
pub const HISTORY_FILE: &str = "history.json";
pub const GROUPS_FILE: &str = "groups.json";
pub const GLOBAL_CONTEXT_FILE: &str = "global_context.txt";

/// 单个文件的导入问题，带文件名反馈给用户
#[derive(Debug)]
pub struct ImportIssue {
    pub file: String,
    pub message: String,
}

/// 导入结果：组装好的状态 + 逐文件的问题清单
#[derive(Debug)]
pub struct ImportOutcome {
    pub state: ProjectState,
    pub issues: Vec<ImportIssue>,
}

/// 从 (文件名, 内容) 列表组装项目状态
///
/// 语言文件解析失败只记录问题，其余文件照常处理；随行文件
/// （context/history/groups/global_context）损坏时退回空默认值。
/// 一个有效语言文件都没有时整次导入失败。
pub fn import_entries(entries: &[(String, Vec<u8>)]) -> Result<ImportOutcome, AppError> {
    let mut state = ProjectState::default();
    let mut issues = Vec::new();

    for (name, bytes) in entries {
        match name.as_str() {
            CONTEXT_FILE => match serde_json::from_slice::<BTreeMap<String, String>>(bytes) {
                Ok(map) => state.contexts = map,
                Err(e) => issues.push(ImportIssue {
                    file: name.clone(),
                    message: format!("上下文文件解析失败: {}", e),
                }),
            },
            HISTORY_FILE => {
                match serde_json::from_slice::<BTreeMap<String, BTreeMap<String, String>>>(bytes) {
                    Ok(map) => state.history = map,
                    Err(e) => issues.push(ImportIssue {
                        file: name.clone(),
                        message: format!("历史文件解析失败: {}", e),
                    }),
                }
            }
            GROUPS_FILE => match serde_json::from_slice::<Vec<Group>>(bytes) {
                Ok(groups) => state.groups = groups,
                Err(e) => issues.push(ImportIssue {
                    file: name.clone(),
                    message: format!("分组文件解析失败: {}", e),
                }),
            },
            GLOBAL_CONTEXT_FILE => {
                state.global_context = String::from_utf8_lossy(bytes).into_owned();
            }
            other if other.ends_with(".json") => {
                let stem = other.trim_end_matches(".json");
                match serde_json::from_slice::<Value>(bytes) {
                    Ok(data) if data.is_object() => {
                        if let Err(e) = state.add_file(stem, data) {
                            issues.push(ImportIssue {
                                file: name.clone(),
                                message: e.to_string(),
                            });
                        }
                    }
                    Ok(_) => issues.push(ImportIssue {
                        file: name.clone(),
                        message: "语言文件的根节点必须是映射".to_string(),
                    }),
                    Err(e) => issues.push(ImportIssue {
                        file: name.clone(),
                        message: format!("JSON解析失败: {}", e),
                    }),
                }
            }
            other => {
                tracing::debug!("忽略无关文件: {}", other);
            }
        }
    }

    if state.files.is_empty() {
        return Err(AppError::State(
            "导入失败：没有任何有效的语言文件".to_string(),
        ));
    }

    tracing::info!(
        "导入完成：{} 个语言文件，{} 个键，{} 个问题",
        state.files.len(),
        state.key_universe().len(),
        issues.len()
    );
    Ok(ImportOutcome { state, issues })
}

/// 从目录导入（忽略子目录；按文件名排序保证顺序确定）
pub fn import_dir(dir: &Path) -> Result<ImportOutcome, AppError> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        entries.push((name, std::fs::read(entry.path())?));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    import_entries(&entries)
}

/// 从ZIP读取器导入：展开为同样的文件列表后走统一入口
pub fn import_zip<R: Read + Seek>(reader: R) -> Result<ImportOutcome, AppError> {
    let mut archive = ZipArchive::new(reader)?;
    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        // 只取条目基本名，目录前缀不参与分类
        let base = entry
            .name()
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        if base.is_empty() {
            continue;
        }
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut bytes)?;
        entries.push((base, bytes));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    import_entries(&entries)
}

/// 从ZIP文件导入
pub fn import_zip_file(path: &Path) -> Result<ImportOutcome, AppError> {
    import_zip(std::fs::File::open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::tempdir;

    fn entry(name: &str, content: &str) -> (String, Vec<u8>) {
        (name.to_string(), content.as_bytes().to_vec())
    }

    #[test]
    fn test_import_two_languages_with_sidecars() {
        let outcome = import_entries(&[
            entry("pl.json", r#"{"buttons":{"submit":"Zapisz"}}"#),
            entry("en.json", r#"{"buttons":{"submit":"Save"}}"#),
            entry("context.json", r#"{"buttons.submit":"主操作按钮"}"#),
            entry("history.json", r#"{"buttons.submit":{"en":"Save"}}"#),
            entry(
                "groups.json",
                r#"[{"id":"g1","name":"按钮","context":"UI按钮","keys":["buttons.submit"],"referenceKeys":["buttons.submit"]}]"#,
            ),
            entry("global_context.txt", "电商后台界面"),
        ])
        .expect("导入应该成功");

        assert!(outcome.issues.is_empty(), "全部文件有效时没有问题");
        let state = outcome.state;
        assert_eq!(state.files.len(), 2);
        assert_eq!(state.key_universe(), &["buttons.submit".to_string()]);
        assert_eq!(
            state.contexts.get("buttons.submit").map(String::as_str),
            Some("主操作按钮")
        );
        assert_eq!(state.groups.len(), 1);
        assert_eq!(state.groups[0].reference_keys, vec!["buttons.submit"]);
        assert_eq!(state.global_context, "电商后台界面");
    }

    #[test]
    fn test_malformed_translation_file_isolated() {
        let outcome = import_entries(&[
            entry("pl.json", r#"{"x":"cześć"}"#),
            entry("broken.json", "{不是JSON"),
        ])
        .expect("还有有效文件时导入应该成功");

        assert_eq!(outcome.state.files.len(), 1);
        assert_eq!(outcome.issues.len(), 1);
        assert_eq!(outcome.issues[0].file, "broken.json", "问题要带上文件名");
    }

    #[test]
    fn test_all_translation_files_invalid_aborts() {
        let result = import_entries(&[
            entry("pl.json", "{坏的"),
            entry("context.json", r#"{"k":"v"}"#),
        ]);
        assert!(
            matches!(result, Err(AppError::State(_))),
            "没有有效语言文件时整次导入失败"
        );
    }

    #[test]
    fn test_malformed_sidecar_does_not_abort() {
        let outcome = import_entries(&[
            entry("pl.json", r#"{"x":"cześć"}"#),
            entry("context.json", "{坏的"),
        ])
        .expect("语言文件有效时导入应该成功");

        assert_eq!(outcome.state.files.len(), 1);
        assert!(outcome.state.contexts.is_empty(), "损坏的随行文件退回默认值");
        assert_eq!(outcome.issues.len(), 1);
        assert_eq!(outcome.issues[0].file, "context.json");
    }

    #[test]
    fn test_non_object_root_rejected() {
        let outcome = import_entries(&[
            entry("pl.json", r#"{"x":1}"#),
            entry("list.json", r#"[1,2,3]"#),
        ])
        .expect("导入应该成功");
        assert_eq!(outcome.state.files.len(), 1);
        assert_eq!(outcome.issues.len(), 1);
    }

    #[test]
    fn test_import_dir() {
        let dir = tempdir().expect("创建临时目录失败");
        let mut f = std::fs::File::create(dir.path().join("pl.json")).expect("创建文件失败");
        f.write_all(br#"{"a":{"b":"c"}}"#).expect("写入失败");
        std::fs::write(dir.path().join("notes.txt"), "无关文件").expect("写入失败");

        let outcome = import_dir(dir.path()).expect("目录导入应该成功");
        assert_eq!(outcome.state.files.len(), 1);
        assert_eq!(outcome.state.files[0].name, "pl");
        assert_eq!(outcome.state.key_universe(), &["a.b".to_string()]);
    }

    #[test]
    fn test_import_zip_round_trip() {
        use crate::io::export::export_zip;

        let mut state = ProjectState::default();
        state
            .add_file("pl", json!({"buttons": {"submit": "Zapisz"}}))
            .expect("加载应该成功");
        state
            .add_file("en", json!({"buttons": {"submit": "Save"}}))
            .expect("加载应该成功");
        state
            .contexts
            .insert("buttons.submit".into(), "主按钮".into());
        state.global_context = "测试项目".into();

        let mut buf = std::io::Cursor::new(Vec::new());
        export_zip(&state, &mut buf).expect("导出应该成功");
        buf.set_position(0);

        let outcome = import_zip(buf).expect("ZIP导入应该成功");
        assert!(outcome.issues.is_empty());
        assert_eq!(outcome.state.files.len(), 2);
        assert_eq!(outcome.state.key_universe(), &["buttons.submit".to_string()]);
        assert_eq!(
            outcome.state.value_of("pl", "buttons.submit").expect("路径合法"),
            Some(&json!("Zapisz"))
        );
        assert_eq!(
            outcome.state.contexts.get("buttons.submit").map(String::as_str),
            Some("主按钮")
        );
        assert_eq!(outcome.state.global_context, "测试项目");
    }
}
