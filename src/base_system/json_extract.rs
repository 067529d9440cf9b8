//! 宽松的 JSON 取值工具：远端接口的数字字段有时是字符串，有时是数字。

use serde_json::Value;

pub type JsonMap = serde_json::Map<String, Value>;

pub fn pick_string(map: &JsonMap, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(val) = map.get(*key) {
            if let Some(s) = val.as_str() {
                let trimmed = s.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            } else if let Some(n) = val.as_u64() {
                return Some(n.to_string());
            } else if let Some(n) = val.as_i64() {
                return Some(n.to_string());
            }
        }
    }
    None
}

pub fn pick_u64(map: &JsonMap, keys: &[&str]) -> Option<u64> {
    for key in keys {
        if let Some(val) = map.get(*key) {
            if let Some(n) = val.as_u64() {
                return Some(n);
            }
            if let Some(s) = val.as_str()
                && let Ok(n) = s.trim().parse::<u64>()
            {
                return Some(n);
            }
        }
    }
    None
}

pub fn pick_objects<'a>(map: &'a JsonMap, key: &str) -> Vec<&'a JsonMap> {
    map.get(key)
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(|v| v.as_object()).collect())
        .unwrap_or_default()
}

/// 解析 `"1,2,2,114"` 形式的 id 列表；保留顺序与重复，跳过非数字片段。
pub fn id_list(value: Option<&Value>) -> Vec<u32> {
    match value {
        Some(Value::String(s)) => s
            .split(',')
            .filter_map(|p| p.trim().parse::<u32>().ok())
            .collect(),
        Some(Value::Array(arr)) => arr
            .iter()
            .filter_map(|v| match v {
                Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
                Value::String(s) => s.trim().parse::<u32>().ok(),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}
