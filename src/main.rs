//! # XtalComp - 晶体结构比较
//!
//! 读取两个 POSCAR 文件，在给定容差内判断两个结构是否等价，
//! 并输出固定宽度的文本报告。
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (比较流程编排)
//!   │     ├── parsers/   (POSCAR 解析器)
//!   │     ├── compare/   (等距搜索)
//!   │     ├── report/    (文本/JSON 报告)
//!   │     └── models/    (数据模型)
//!   ├── utils/      (输出与诊断)
//!   └── error.rs    (错误处理)
//! ```

mod cli;
mod commands;
mod compare;
mod error;
mod models;
mod parsers;
mod report;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
