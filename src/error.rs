//! # 统一错误处理模块
//!
//! 定义 XtalComp 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// XtalComp 统一错误类型
#[derive(Error, Debug)]
pub enum XtalCompError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    /// 某行解析出的字段数少于格式要求（文件提前结束时 found = 0）
    #[error("{path}:{line}: expected {expected} field(s) for {what}, found {found}")]
    MalformedField {
        path: String,
        line: usize,
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{path}:{line}: more than {max} species declared")]
    SpeciesOverflow {
        path: String,
        line: usize,
        max: usize,
    },

    #[error("{path}:{line}: total atom count does not fit in memory")]
    AtomCountOverflow { path: String, line: usize },

    #[error("{path}: lattice is singular, cannot convert Cartesian coordinates")]
    SingularLattice { path: String },

    // ─────────────────────────────────────────────────────────────
    // 编排错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid input: {}", files.join(", "))]
    InvalidInput { files: Vec<String> },

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl XtalCompError {
    /// 行读取失败（文件提前结束）
    pub fn eof(path: &str, line: usize, what: &'static str, expected: usize) -> Self {
        XtalCompError::MalformedField {
            path: path.to_string(),
            line,
            what,
            expected,
            found: 0,
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, XtalCompError>;
