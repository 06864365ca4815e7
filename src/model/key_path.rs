//! 键路径寻址：点分路径在嵌套JSON树中的读、写与叶子路径枚举

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::model::project::{AppError, TranslationFile};

/// 校验键路径：空路径或含空段的路径视为编程错误
fn check_path(path: &str) -> Result<(), AppError> {
    if path.is_empty() || path.split('.').any(str::is_empty) {
        return Err(AppError::InvalidPath(format!(
            "键路径为空或含空段: {:?}",
            path
        )));
    }
    Ok(())
}

/// 按点分路径读取值
///
/// 逐段下钻映射节点；任一中间段缺失或当前节点不是映射时返回 `Ok(None)`，
/// 表示"该语言没有这个键"，不是错误。空路径返回 `InvalidPath`。
pub fn get<'a>(tree: &'a Value, path: &str) -> Result<Option<&'a Value>, AppError> {
    check_path(path)?;
    let mut cur = tree;
    for seg in path.split('.') {
        match cur {
            Value::Object(map) => match map.get(seg) {
                Some(child) => cur = child,
                None => return Ok(None),
            },
            _ => return Ok(None),
        }
    }
    Ok(Some(cur))
}

/// 按点分路径写入值，返回新树
///
/// 输入树不被修改；路径上的节点逐层复制，缺失或非映射的中间节点
/// 按"创建路径"策略替换为新的空映射，同级键原样保留。
pub fn set(tree: &Value, path: &str, value: Value) -> Result<Value, AppError> {
    check_path(path)?;

    fn place(node: &Value, segments: &[&str], value: Value) -> Value {
        let mut map = match node {
            Value::Object(m) => m.clone(),
            _ => Map::new(),
        };
        let (head, rest) = (segments[0], &segments[1..]);
        if rest.is_empty() {
            map.insert(head.to_string(), value);
        } else {
            let child = map.get(head).cloned().unwrap_or(Value::Null);
            map.insert(head.to_string(), place(&child, rest, value));
        }
        Value::Object(map)
    }

    let segments: Vec<&str> = path.split('.').collect();
    Ok(place(tree, &segments, value))
}

/// 枚举一棵树中所有可寻址的叶子键路径
///
/// 深度优先遍历映射节点；null、标量与非空数组视为叶子（数组整体作为
/// 一个值，不按下标展开），空数组与空映射不产生路径。非映射根节点
/// 贡献零个键而不报错，便于单个文件损坏时整体降级。
pub fn flatten_leaf_paths(tree: &Value) -> BTreeSet<String> {
    fn walk(out: &mut BTreeSet<String>, v: &Value, path: &str) {
        match v {
            Value::Object(map) => {
                for (k, child) in map {
                    let child_path = if path.is_empty() {
                        k.clone()
                    } else {
                        format!("{}.{}", path, k)
                    };
                    walk(out, child, &child_path);
                }
            }
            Value::Array(arr) => {
                if !arr.is_empty() && !path.is_empty() {
                    out.insert(path.to_string());
                }
            }
            _ => {
                if !path.is_empty() {
                    out.insert(path.to_string());
                }
            }
        }
    }

    let mut out = BTreeSet::new();
    walk(&mut out, tree, "");
    out
}

/// 计算全部语言文件的键全集：各文件叶子路径的并集，按字节序升序
///
/// 排序与文件加载顺序无关，保证跨会话的确定性列表。
pub fn union_keys(files: &[TranslationFile]) -> Vec<String> {
    let mut all = BTreeSet::new();
    for file in files {
        all.extend(flatten_leaf_paths(&file.data));
    }
    all.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_nested_value() {
        let tree = json!({"buttons": {"submit": "Zapisz"}});
        let v = get(&tree, "buttons.submit").expect("路径合法");
        assert_eq!(v, Some(&json!("Zapisz")));
    }

    #[test]
    fn test_get_missing_is_none_not_error() {
        let tree = json!({"buttons": {"submit": "Save"}});
        assert_eq!(get(&tree, "buttons.cancel").expect("路径合法"), None);
        assert_eq!(get(&tree, "menu.items.first").expect("路径合法"), None);
        // 中间节点是标量时同样短路为None
        assert_eq!(get(&tree, "buttons.submit.deep").expect("路径合法"), None);
    }

    #[test]
    fn test_empty_path_is_invalid() {
        let tree = json!({});
        assert!(matches!(get(&tree, ""), Err(AppError::InvalidPath(_))));
        assert!(matches!(
            set(&tree, "", json!(1)),
            Err(AppError::InvalidPath(_))
        ));
        assert!(matches!(
            set(&tree, "a..b", json!(1)),
            Err(AppError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_set_round_trip() {
        let tree = json!({"a": {"b": "老值"}, "c": 1});
        for value in [json!("新值"), json!(42), json!(true), json!(null), json!([1, 2])] {
            let updated = set(&tree, "a.b", value.clone()).expect("写入应该成功");
            assert_eq!(
                get(&updated, "a.b").expect("路径合法"),
                Some(&value),
                "写后读应该返回刚写入的值"
            );
        }
    }

    #[test]
    fn test_set_does_not_mutate_input() {
        let tree = json!({"a": {"b": 1}});
        let _updated = set(&tree, "a.b", json!(2)).expect("写入应该成功");
        assert_eq!(tree, json!({"a": {"b": 1}}), "原树必须保持不变");
    }

    #[test]
    fn test_set_non_interference() {
        let tree = json!({"a": {"b": 1, "c": 2}, "d": {"e": 3}});
        let updated = set(&tree, "a.b", json!(99)).expect("写入应该成功");
        assert_eq!(get(&updated, "a.c").expect("路径合法"), Some(&json!(2)));
        assert_eq!(get(&updated, "d.e").expect("路径合法"), Some(&json!(3)));
    }

    #[test]
    fn test_set_creates_path_chain() {
        let updated = set(&json!({}), "a.b.c", json!(5)).expect("写入应该成功");
        assert_eq!(get(&updated, "a.b.c").expect("路径合法"), Some(&json!(5)));
        // 中间节点是包含c的映射
        let mid = get(&updated, "a.b").expect("路径合法").expect("中间节点存在");
        assert!(mid.is_object(), "中间节点应该是映射");
        assert!(mid.get("c").is_some());
    }

    #[test]
    fn test_set_overwrites_scalar_intermediate() {
        // 中间位置已有标量时按"创建路径"策略整体替换
        let tree = json!({"a": "原本是字符串"});
        let updated = set(&tree, "a.b", json!(1)).expect("写入应该成功");
        assert_eq!(get(&updated, "a.b").expect("路径合法"), Some(&json!(1)));
    }

    #[test]
    fn test_set_overwrites_mapping_with_scalar() {
        // 末段指向既有映射时允许破坏性覆盖
        let tree = json!({"a": {"b": {"c": 1}}});
        let updated = set(&tree, "a.b", json!("标量")).expect("写入应该成功");
        assert_eq!(
            get(&updated, "a.b").expect("路径合法"),
            Some(&json!("标量"))
        );
    }

    #[test]
    fn test_flatten_leaf_paths() {
        let tree = json!({
            "buttons": {"submit": "保存", "cancel": "取消"},
            "count": 3,
            "enabled": true,
            "nothing": null,
            "tags": ["a", "b"],
            "empty_list": [],
            "empty_obj": {}
        });
        let paths: Vec<String> = flatten_leaf_paths(&tree).into_iter().collect();
        assert_eq!(
            paths,
            vec![
                "buttons.cancel",
                "buttons.submit",
                "count",
                "enabled",
                "nothing",
                "tags"
            ],
            "空数组与空映射不产生路径，数组整体是一个叶子"
        );
    }

    #[test]
    fn test_flatten_non_object_root() {
        assert!(flatten_leaf_paths(&json!("裸字符串")).is_empty());
        assert!(flatten_leaf_paths(&json!(null)).is_empty());
        assert!(flatten_leaf_paths(&json!([1, 2, 3])).is_empty());
    }

    #[test]
    fn test_union_keys_deterministic() {
        let a = TranslationFile {
            name: "pl".into(),
            data: json!({"x": "cześć", "z": 1}),
        };
        let b = TranslationFile {
            name: "en".into(),
            data: json!({"y": "hi"}),
        };
        let ab = union_keys(&[a.clone(), b.clone()]);
        let ba = union_keys(&[b, a]);
        assert_eq!(ab, ba, "键全集与文件顺序无关");
        assert_eq!(ab, vec!["x", "y", "z"], "结果按字节序升序");
    }

    #[test]
    fn test_union_keys_missing_key_tolerance() {
        let pl = TranslationFile {
            name: "pl".into(),
            data: json!({"x": "cześć"}),
        };
        let en = TranslationFile {
            name: "en".into(),
            data: json!({}),
        };
        assert_eq!(get(&en.data, "x").expect("路径合法"), None);
        assert_eq!(union_keys(&[pl, en]), vec!["x"], "缺失键仍出现在全集中");
    }

    #[test]
    fn test_concrete_two_language_scenario() {
        let pl = TranslationFile {
            name: "pl".into(),
            data: json!({"buttons": {"submit": "Zapisz"}}),
        };
        let mut en = TranslationFile {
            name: "en".into(),
            data: json!({"buttons": {"submit": "Save"}}),
        };
        assert_eq!(
            union_keys(&[pl.clone(), en.clone()]),
            vec!["buttons.submit"]
        );

        en.data = set(&en.data, "buttons.submit", json!("Save Now")).expect("写入应该成功");
        assert_eq!(
            get(&en.data, "buttons.submit").expect("路径合法"),
            Some(&json!("Save Now"))
        );
        assert_eq!(
            get(&pl.data, "buttons.submit").expect("路径合法"),
            Some(&json!("Zapisz")),
            "编辑en不影响pl"
        );
    }
}
