//! # compare 命令实现
//!
//! 依次解析两个 POSCAR，任一失败则输出 "Invalid input" 报告并以非零状态退出，
//! 不调用比较器；否则比较两个结构并输出报告。
//!
//! ## 依赖关系
//! - 使用 `cli/mod.rs` 定义的参数
//! - 使用 `parsers/poscar.rs`, `compare/`, `report/`
//! - 使用 `utils/output.rs`, `utils/diagnostics.rs`

use crate::cli::Cli;
use crate::compare::{IsometrySearch, StructureComparator};
use crate::error::{Result, XtalCompError};
use crate::models::{Structure, Tolerances};
use crate::parsers::PoscarParser;
use crate::report::{self, Report};
use crate::utils::diagnostics::{Diagnostics, LogSink};
use crate::utils::output;

use std::path::Path;

const LOG_TARGET: &str = "xtalcomp::poscar";

/// 执行比较
pub fn execute(args: Cli) -> Result<()> {
    if !args.extra.is_empty() {
        output::print_warning(&format!(
            "Ignoring {} extra argument(s) after the two POSCAR files",
            args.extra.len()
        ));
    }

    let tolerances = Tolerances {
        cart: args.cart_tol,
        angle: args.angle_tol,
    };
    let parser = PoscarParser::new().with_max_species(args.max_species);
    log::debug!("species ceiling: {}", parser.max_species());

    // 两个文件都要解析，失败不提前返回，以便报告所有出错的文件
    let first = parse_input(&parser, &args.poscar1, args.debug);
    let second = parse_input(&parser, &args.poscar2, args.debug);

    let (first, second) = match (first, second) {
        (Ok(a), Ok(b)) => (a, b),
        (a, b) => {
            let files: Vec<String> = [(&args.poscar1, a.is_err()), (&args.poscar2, b.is_err())]
                .iter()
                .filter(|(_, failed)| *failed)
                .map(|(p, _)| p.display().to_string())
                .collect();

            let rendered = if args.json {
                report::json::render_invalid(&files)?
            } else {
                report::text::render_invalid()
            };
            print!("{}", rendered);
            return Err(XtalCompError::InvalidInput { files });
        }
    };

    let comparison = IsometrySearch::new().compare(&first, &second, &tolerances);
    log::info!(
        "{} vs {}: {}",
        args.poscar1.display(),
        args.poscar2.display(),
        if comparison.matched { "match" } else { "no match" }
    );

    let report = Report {
        tolerances,
        comparison: &comparison,
        first: &first,
        second: &second,
    };
    if args.json {
        println!("{}", report::json::render(&report)?);
    } else {
        print!("{}", report::text::render(&report));
    }

    Ok(())
}

/// 解析一个输入文件；`debug` 时把诊断信息缓存下来并打印到 stderr
fn parse_input(parser: &PoscarParser, path: &Path, debug: bool) -> Result<Structure> {
    let result = if debug {
        let mut diagnostics = Diagnostics::new();
        let result = parser.parse_file(path, &mut diagnostics);
        dump_diagnostics(path, &diagnostics);
        result
    } else {
        parser.parse_file(path, &mut LogSink::new(LOG_TARGET))
    };

    if let Err(e) = &result {
        output::print_error(&e.to_string());
    }
    result
}

fn dump_diagnostics(path: &Path, diagnostics: &Diagnostics) {
    if diagnostics.is_empty() {
        return;
    }
    eprintln!("--- diagnostics: {} ---", path.display());
    for line in diagnostics.entries() {
        eprintln!("{}", line);
    }
}
