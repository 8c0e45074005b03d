//! # 诊断信息收集
//!
//! 解析器的调试输出写入调用方提供的 sink，而不是进程级的全局缓冲区，
//! 因此两次解析（或并行运行的测试）之间互不干扰。
//!
//! ## 依赖关系
//! - 被 `parsers/poscar.rs`, `commands/compare.rs` 使用
//! - 使用 `log` crate

/// 诊断信息接收端
pub trait DiagnosticSink {
    fn record(&mut self, message: String);
}

/// 直接转发到 `log::debug!`，由 `RUST_LOG` 控制是否显示
#[derive(Debug, Clone, Copy)]
pub struct LogSink {
    target: &'static str,
}

impl LogSink {
    pub fn new(target: &'static str) -> Self {
        LogSink { target }
    }
}

impl DiagnosticSink for LogSink {
    fn record(&mut self, message: String) {
        log::debug!(target: self.target, "{}", message);
    }
}

/// 内存中的诊断缓冲区（`--debug` 时在报告之后输出）
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    entries: Vec<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DiagnosticSink for Diagnostics {
    fn record(&mut self, message: String) {
        self.entries.push(message);
    }
}

impl DiagnosticSink for Vec<String> {
    fn record(&mut self, message: String) {
        self.push(message);
    }
}
