//! 编辑值回填：按旧值的类型标签决定编辑文本如何解析回JSON值

use serde_json::Value;

/// 旧值的类型标签（含"该语言没有这个键"的Absent）
///
/// 显式枚举，回填逻辑对每个变体穷尽匹配，不靠运行时猜测。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Absent,
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl ValueKind {
    /// 对 `get` 的结果分类
    pub fn of(value: Option<&Value>) -> Self {
        match value {
            None => Self::Absent,
            Some(Value::Null) => Self::Null,
            Some(Value::Bool(_)) => Self::Bool,
            Some(Value::Number(_)) => Self::Number,
            Some(Value::String(_)) => Self::String,
            Some(Value::Array(_)) => Self::Array,
            Some(Value::Object(_)) => Self::Object,
        }
    }
}

/// 把用户编辑后的文本按旧值类型回填为JSON值
///
/// 旧值是布尔/数字时尝试按原类型解析，解析不了就保留为字符串；
/// 旧值是数组/对象时尝试整体按JSON解析；其余情况一律作为字符串。
pub fn coerce_edit(prev: ValueKind, input: &str) -> Value {
    match prev {
        ValueKind::Bool => match input.trim() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(input.to_string()),
        },
        ValueKind::Number => serde_json::from_str::<serde_json::Number>(input.trim())
            .map(Value::Number)
            .unwrap_or_else(|_| Value::String(input.to_string())),
        ValueKind::Array | ValueKind::Object => serde_json::from_str::<Value>(input)
            .unwrap_or_else(|_| Value::String(input.to_string())),
        ValueKind::Absent | ValueKind::Null | ValueKind::String => {
            Value::String(input.to_string())
        }
    }
}
