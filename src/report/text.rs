//! # 文本报告
//!
//! 结果行、可选的 4x4 变换矩阵，以及两个输入结构并排的晶格与原子表。
//!
//! ## 依赖关系
//! - 被 `commands/compare.rs` 使用
//! - 使用 `tabled` crate

use super::Report;
use crate::models::{CoordinateMode, Structure, Transform};

use tabled::settings::Style;
use tabled::{Table, Tabled};

/// 摘要表的一行
#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "")]
    field: &'static str,
    #[tabled(rename = "First structure")]
    first: String,
    #[tabled(rename = "Second structure")]
    second: String,
}

/// 晶格表的一行
#[derive(Tabled)]
struct LatticeRow {
    #[tabled(rename = "First cell matrix (row vectors)")]
    first: String,
    #[tabled(rename = "Second cell matrix (row vectors)")]
    second: String,
}

/// 原子表的一行，原子数不同时较短的一侧留空
#[derive(Tabled)]
struct AtomRow {
    #[tabled(rename = "First type: fractional coordinate")]
    first: String,
    #[tabled(rename = "Second type: fractional coordinate")]
    second: String,
}

const DIVIDER: &str = "----------";

/// 渲染完整的文本报告
pub fn render(report: &Report) -> String {
    let mut out = String::new();

    out.push_str("XtalComp Results\n");
    out.push_str("Result:\n");
    out.push_str(&format!(
        "Using a cartesian tolerance of {:.6} and an angular tolerance of {:.6}...\n",
        report.tolerances.cart, report.tolerances.angle
    ));
    out.push_str(&format!(
        "The structures {} match!\n",
        if report.comparison.matched { "DO" } else { "do NOT" }
    ));

    if let Some(transform) = &report.comparison.transform {
        out.push_str(&render_transform(transform));
    }

    out.push_str("Input structures:\n");
    out.push_str(&ascii_table(&summary_rows(report.first, report.second)));
    out.push_str(&ascii_table(&lattice_rows(report.first, report.second)));
    out.push_str(&ascii_table(&atom_rows(report.first, report.second)));

    out
}

/// 任一输入文件解析失败时的报告
pub fn render_invalid() -> String {
    "XtalComp Results\nInvalid input\nGo back and check your inputs.\n".to_string()
}

fn render_transform(transform: &Transform) -> String {
    let mut out = String::new();
    let border = format!("|--{0}--{0}--{0}--{0}--|\n", DIVIDER);

    out.push_str("Transformation matrix:\n");
    out.push_str(&border);
    for row in &transform.0 {
        out.push_str(&format!(
            "|  {:+10.5}  {:+10.5}  {:+10.5}  {:+10.5}  |\n",
            row[0], row[1], row[2], row[3]
        ));
    }
    out.push_str(&border);
    if !transform.is_proper() {
        out.push_str("(the rotation part includes an inversion)\n");
    }
    out
}

fn ascii_table<T: Tabled>(rows: &[T]) -> String {
    let mut table = Table::new(rows);
    table.with(Style::ascii());
    format!("{}\n", table)
}

fn describe_mode(s: &Structure) -> String {
    let mode = match s.mode() {
        CoordinateMode::Direct => "direct",
        CoordinateMode::Cartesian => "cartesian",
    };
    if s.selective_dynamics() {
        format!("{} (selective dynamics)", mode)
    } else {
        mode.to_string()
    }
}

fn summary_rows(first: &Structure, second: &Structure) -> Vec<SummaryRow> {
    let counts = |s: &Structure| {
        s.species_counts()
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    };

    vec![
        SummaryRow {
            field: "name",
            first: first.name().to_string(),
            second: second.name().to_string(),
        },
        SummaryRow {
            field: "atoms",
            first: first.num_atoms().to_string(),
            second: second.num_atoms().to_string(),
        },
        SummaryRow {
            field: "species counts",
            first: counts(first),
            second: counts(second),
        },
        SummaryRow {
            field: "coordinates",
            first: describe_mode(first),
            second: describe_mode(second),
        },
    ]
}

fn format_vec(v: &[f64; 3]) -> String {
    format!("{:9.5} {:9.5} {:9.5}", v[0], v[1], v[2])
}

fn lattice_rows(first: &Structure, second: &Structure) -> Vec<LatticeRow> {
    first
        .lattice()
        .matrix
        .iter()
        .zip(second.lattice().matrix.iter())
        .map(|(a, b)| LatticeRow {
            first: format_vec(a),
            second: format_vec(b),
        })
        .collect()
}

fn format_atom(s: &Structure, i: usize) -> String {
    match (s.types().get(i), s.positions().get(i)) {
        (Some(t), Some(p)) => format!("{:3}: {}", t, format_vec(p)),
        _ => String::new(),
    }
}

fn atom_rows(first: &Structure, second: &Structure) -> Vec<AtomRow> {
    let n = first.num_atoms().max(second.num_atoms());
    (0..n)
        .map(|i| AtomRow {
            first: format_atom(first, i),
            second: format_atom(second, i),
        })
        .collect()
}
