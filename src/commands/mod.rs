//! # 命令执行模块
//!
//! 实现比较流程的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `parsers/`, `compare/`, `report/`, `utils/`
//! - 子模块: compare

pub mod compare;

use crate::cli::Cli;
use crate::error::Result;

/// 执行命令
pub fn run(cli: Cli) -> Result<()> {
    compare::execute(cli)
}
