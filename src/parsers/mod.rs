//! # 解析器模块
//!
//! 提供 POSCAR 结构文件解析器及其使用的数值字段扫描器。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: scanner, poscar

pub mod poscar;
pub mod scanner;

pub use poscar::{PoscarParser, MAX_SPECIES};
