//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数。
//!
//! ```text
//! xtalcomp [-h|--help] [-c|--cart TOL] [-a|--ang TOL] POSCAR1 POSCAR2
//! ```
//!
//! 容差也可以通过环境变量 `XTALCOMP_CART_TOL` / `XTALCOMP_ANGLE_TOL` 设置，
//! 命令行参数优先。
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 参数传递给 `commands/compare.rs`

use crate::models::comparison::{DEFAULT_ANGLE_TOL, DEFAULT_CART_TOL};
use crate::parsers::MAX_SPECIES;

use clap::Parser;
use std::path::PathBuf;

/// XtalComp - compare two crystal structures for equivalence
#[derive(Parser, Debug)]
#[command(name = "xtalcomp")]
#[command(version)]
#[command(
    about = "Compare the POSCARs of two structures for geometric equivalence",
    long_about = "Input the POSCARs of the two structures you want to compare.\n\
                  Enter the tolerances you want (or use the defaults).\n\
                  The results will be printed to the command line."
)]
pub struct Cli {
    /// First POSCAR file
    pub poscar1: PathBuf,

    /// Second POSCAR file
    pub poscar2: PathBuf,

    /// Additional positional arguments are ignored
    #[arg(hide = true)]
    pub extra: Vec<PathBuf>,

    /// Cartesian tolerance in angstroms
    #[arg(
        short = 'c',
        long = "cart",
        value_name = "TOL",
        env = "XTALCOMP_CART_TOL",
        default_value_t = DEFAULT_CART_TOL,
        allow_negative_numbers = true
    )]
    pub cart_tol: f64,

    /// Angular tolerance in degrees
    #[arg(
        short = 'a',
        long = "ang",
        value_name = "TOL",
        env = "XTALCOMP_ANGLE_TOL",
        default_value_t = DEFAULT_ANGLE_TOL,
        allow_negative_numbers = true
    )]
    pub angle_tol: f64,

    /// Maximum number of species allowed on the counts line
    #[arg(long, value_name = "N", default_value_t = MAX_SPECIES)]
    pub max_species: usize,

    /// Print the report as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Print parser diagnostics for each file to stderr
    #[arg(long, default_value_t = false)]
    pub debug: bool,
}
