//! 行号定位：在规范化pretty输出中按键路径查找行号（启发式，非解析器）

/// 扫描一行，返回（开括号数，闭括号数，行首的闭括号数）
///
/// 引号感知：跳过字符串字面量内部的花括号与方括号。行首闭括号指
/// 除空白和逗号外没有任何前置内容的闭括号，它们在该行生效前就收缩
/// 了嵌套深度。
fn scan_line(line: &str) -> (usize, usize, usize) {
    let mut opens = 0usize;
    let mut closes = 0usize;
    let mut leading_closes = 0usize;
    let mut leading = true;
    let mut in_string = false;
    let mut escaped = false;
    for ch in line.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => {
                in_string = !in_string;
                leading = false;
            }
            '{' | '[' if !in_string => {
                opens += 1;
                leading = false;
            }
            '}' | ']' if !in_string => {
                closes += 1;
                if leading {
                    leading_closes += 1;
                }
            }
            c if !in_string && (c.is_whitespace() || c == ',') => {}
            _ => leading = false,
        }
    }
    (opens, closes, leading_closes)
}

/// 在 `serde_json::to_string_pretty` 产出的文本中查找键路径末段所在行
///
/// 按括号深度逐行推进，依次匹配路径各段：第n段只在深度n处、且前n-1段
/// 已匹配时生效；离开已匹配祖先的作用域时回退匹配进度。返回1起始的
/// 行号，未命中返回 `None`。
///
/// 这是纯文本启发式：行号只对本工具重新序列化的文本有意义，不用于
/// 任何回写寻址。同深度下末段同名的兄弟键仍可能误判。
pub fn locate_line(pretty_text: &str, path: &str) -> Option<usize> {
    if path.is_empty() {
        return None;
    }
    let segments: Vec<&str> = path.split('.').collect();

    let mut depth = 0usize;
    // 每段匹配时所处的深度，用于离开作用域时回退
    let mut matched_depths: Vec<usize> = Vec::new();

    for (idx, line) in pretty_text.lines().enumerate() {
        let (opens, closes, leading_closes) = scan_line(line);
        // 行首闭括号先行收缩深度（pretty输出中键不会跟在闭括号后面）
        let depth_at_line = depth.saturating_sub(leading_closes);
        // 回到祖先所在深度意味着它的作用域已结束
        while matched_depths
            .last()
            .is_some_and(|d| *d >= depth_at_line)
        {
            matched_depths.pop();
        }

        let next = matched_depths.len();
        if next < segments.len() && depth_at_line == next + 1 {
            let needle = format!("\"{}\":", segments[next]);
            if line.trim_start().starts_with(&needle) {
                if next + 1 == segments.len() {
                    return Some(idx + 1);
                }
                matched_depths.push(depth_at_line);
            }
        }

        depth = (depth + opens).saturating_sub(closes);
    }
    None
}
