//! # 数据模型模块
//!
//! 定义晶体结构与比较结果数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `compare/`, `commands/`, `report/` 使用
//! - 子模块: structure, comparison

pub mod comparison;
pub mod structure;

pub use comparison::{Comparison, Tolerances, Transform};
pub use structure::{CoordinateMode, Lattice, Structure};
