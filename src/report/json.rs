//! # JSON 报告
//!
//! `--json` 时输出，便于脚本处理。
//!
//! ## 依赖关系
//! - 被 `commands/compare.rs` 使用
//! - 使用 `serde_json` crate

use super::Report;
use crate::error::Result;
use crate::models::{Structure, Tolerances, Transform};

use serde::Serialize;

#[derive(Serialize)]
struct LatticeParameters {
    a: f64,
    b: f64,
    c: f64,
    alpha: f64,
    beta: f64,
    gamma: f64,
    volume: f64,
}

#[derive(Serialize)]
struct StructureEntry<'a> {
    #[serde(flatten)]
    structure: &'a Structure,
    parameters: LatticeParameters,
}

impl<'a> StructureEntry<'a> {
    fn new(structure: &'a Structure) -> Self {
        let lattice = structure.lattice();
        let (a, b, c, alpha, beta, gamma) = lattice.parameters();
        StructureEntry {
            structure,
            parameters: LatticeParameters {
                a,
                b,
                c,
                alpha,
                beta,
                gamma,
                volume: lattice.volume().abs(),
            },
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    valid: bool,
    tolerances: Tolerances,
    matched: bool,
    transform: Option<&'a Transform>,
    proper_rotation: Option<bool>,
    structures: [StructureEntry<'a>; 2],
}

#[derive(Serialize)]
struct InvalidReport<'a> {
    valid: bool,
    invalid_files: &'a [String],
}

pub fn render(report: &Report) -> Result<String> {
    let transform = report.comparison.transform.as_ref();
    let json = JsonReport {
        valid: true,
        tolerances: report.tolerances,
        matched: report.comparison.matched,
        transform,
        proper_rotation: transform.map(Transform::is_proper),
        structures: [
            StructureEntry::new(report.first),
            StructureEntry::new(report.second),
        ],
    };
    Ok(serde_json::to_string_pretty(&json)?)
}

pub fn render_invalid(files: &[String]) -> Result<String> {
    Ok(serde_json::to_string_pretty(&InvalidReport {
        valid: false,
        invalid_files: files,
    })?)
}
