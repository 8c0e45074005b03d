//! # 数值字段扫描器
//!
//! 从一行文本中按顺序提取数值字段，行为与 C 的 `sscanf`
//! 一致：遇到无法解析的字段即停止，多余的尾部内容被忽略。
//! 返回值的长度就是成功解析的字段数，由调用方判断是否足够。
//!
//! ## 依赖关系
//! - 被 `parsers/poscar.rs` 使用
//! - 使用 `regex` crate

use regex::Regex;
use std::sync::OnceLock;

fn float_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?").unwrap()
    })
}

fn int_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[+-]?[0-9]+").unwrap())
}

/// 游标式扫描：跳过前导空白后，从上一个字段结束处匹配最长的数值前缀，
/// 因此 "0.5-0.25" 会得到两个字段；匹配失败即停止
fn scan<T>(line: &str, max_fields: usize, prefix: &Regex) -> Vec<T>
where
    T: std::str::FromStr,
{
    let mut fields = Vec::new();
    let mut rest = line;

    while fields.len() < max_fields {
        rest = rest.trim_start();
        let Some(m) = prefix.find(rest) else {
            break;
        };
        let Ok(value) = m.as_str().parse::<T>() else {
            break;
        };
        fields.push(value);
        rest = &rest[m.end()..];
    }

    fields
}

/// 提取至多 `max_fields` 个浮点字段（与 locale 无关，小数点固定为 '.'）
pub fn scan_floats(line: &str, max_fields: usize) -> Vec<f64> {
    scan(line, max_fields, float_prefix())
}

/// 提取至多 `max_fields` 个整数字段
pub fn scan_ints(line: &str, max_fields: usize) -> Vec<i64> {
    scan(line, max_fields, int_prefix())
}
