//! # 美化输出工具
//!
//! 提供统一的终端状态行样式；报告正文不着色。
//!
//! ## 依赖关系
//! - 被 `main.rs`, `commands/` 模块使用
//! - 使用 `colored` crate

use colored::Colorize;

/// 打印错误消息
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERR]".red().bold(), msg);
}

/// 打印警告消息
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "[WARN]".yellow().bold(), msg);
}
