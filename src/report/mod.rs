//! # 报告模块
//!
//! 将解析得到的两个结构和比较结果渲染为固定宽度文本表格或 JSON。
//!
//! ## 依赖关系
//! - 被 `commands/compare.rs` 使用
//! - 使用 `models/`
//! - 子模块: text, json

pub mod json;
pub mod text;

use crate::models::{Comparison, Structure, Tolerances};

/// 一次完整比较的报告内容
pub struct Report<'a> {
    pub tolerances: Tolerances,
    pub comparison: &'a Comparison,
    pub first: &'a Structure,
    pub second: &'a Structure,
}
