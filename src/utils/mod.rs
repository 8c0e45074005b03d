//! # 工具函数模块
//!
//! 提供美化输出和诊断信息收集。
//!
//! ## 依赖关系
//! - 被 `commands/`, `parsers/` 模块使用
//! - 子模块: output, diagnostics

pub mod diagnostics;
pub mod output;
