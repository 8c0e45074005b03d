//! # VASP POSCAR 格式解析器
//!
//! 解析 VASP 4 风格的 POSCAR/CONTCAR 文件（无元素符号行）。
//!
//! ## POSCAR 格式说明
//! ```text
//! Comment line (structure name)
//! 1.0                    # scaling factor
//! a1 a2 a3               # lattice vector a
//! b1 b2 b3               # lattice vector b
//! c1 c2 c3               # lattice vector c
//! n1 n2 ...              # number of atoms per species (<= 15)
//! Selective dynamics     # optional
//! Direct/Cartesian       # coordinate type
//! x1 y1 z1               # atom positions
//! ...
//! ```
//!
//! 行的顺序就是格式本身，任何一行不满足要求都会使整个文件解析失败，
//! 不做部分恢复。
//!
//! ## 依赖关系
//! - 被 `commands/compare.rs` 使用
//! - 使用 `parsers/scanner.rs`, `models/structure.rs`, `utils/diagnostics.rs`

use crate::error::{Result, XtalCompError};
use crate::models::{CoordinateMode, Lattice, Structure};
use crate::parsers::scanner::{scan_floats, scan_ints};
use crate::utils::diagnostics::DiagnosticSink;

use nalgebra::Vector3;
use std::fs;
use std::path::Path;

/// 默认允许声明的最大原子种类数
pub const MAX_SPECIES: usize = 15;

/// 按行读取并记录行号（从 1 开始）
struct LineReader<'a> {
    lines: std::str::Lines<'a>,
    line_no: usize,
    source: &'a str,
}

impl<'a> LineReader<'a> {
    fn new(content: &'a str, source: &'a str) -> Self {
        LineReader {
            lines: content.lines(),
            line_no: 0,
            source,
        }
    }

    /// 读取下一行；文件结束视为字段不足
    fn next_line(&mut self, what: &'static str, expected: usize) -> Result<&'a str> {
        self.line_no += 1;
        self.lines
            .next()
            .ok_or_else(|| XtalCompError::eof(self.source, self.line_no, what, expected))
    }

    /// 读取一行并要求恰好解析出 `expected` 个浮点字段
    fn next_floats(&mut self, what: &'static str, expected: usize) -> Result<(&'a str, Vec<f64>)> {
        let line = self.next_line(what, expected)?;
        let fields = scan_floats(line, expected);
        if fields.len() < expected {
            return Err(self.malformed(what, expected, fields.len()));
        }
        Ok((line, fields))
    }

    fn malformed(&self, what: &'static str, expected: usize, found: usize) -> XtalCompError {
        XtalCompError::MalformedField {
            path: self.source.to_string(),
            line: self.line_no,
            what,
            expected,
            found,
        }
    }
}

/// POSCAR 解析器，可配置种类数上限
#[derive(Debug, Clone, Copy)]
pub struct PoscarParser {
    max_species: usize,
}

impl Default for PoscarParser {
    fn default() -> Self {
        PoscarParser {
            max_species: MAX_SPECIES,
        }
    }
}

impl PoscarParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_species(mut self, max_species: usize) -> Self {
        self.max_species = max_species;
        self
    }

    pub fn max_species(&self) -> usize {
        self.max_species
    }

    /// 解析 POSCAR 文件
    pub fn parse_file(&self, path: &Path, sink: &mut dyn DiagnosticSink) -> Result<Structure> {
        let bytes = fs::read(path).map_err(|e| XtalCompError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        // 注释行可以是任意字节，非 UTF-8 内容按替换字符处理
        let content = String::from_utf8_lossy(&bytes);

        self.parse_str(&content, &path.display().to_string(), sink)
    }

    /// 从字符串内容解析，`source` 用于错误信息和空注释行时的结构名
    pub fn parse_str(
        &self,
        content: &str,
        source: &str,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Structure> {
        let mut lines = LineReader::new(content, source);

        // Line 1: 注释行，内容任意
        let comment = lines.next_line("comment line", 1)?.trim();
        let name = if comment.is_empty() { source } else { comment };

        // Line 2: 缩放因子（负值按普通乘数处理）
        let (_, scale) = lines.next_floats("scale factor", 1)?;
        let scale = scale[0];

        // Lines 3-5: 晶格向量，先填充行再整体缩放
        let mut matrix = [[0.0; 3]; 3];
        for row in matrix.iter_mut() {
            let (_, v) = lines.next_floats("lattice vector", 3)?;
            *row = [v[0], v[1], v[2]];
        }
        let lattice = Lattice::from_vectors(matrix).scaled(scale);

        // Line 6: 每种原子的数量；多读一个字段用于检测超限
        let counts_line = lines.next_line("species counts", 1)?;
        let counts_line_no = lines.line_no;
        let raw_counts = scan_ints(counts_line, self.max_species.saturating_add(1));
        if raw_counts.len() > self.max_species {
            return Err(XtalCompError::SpeciesOverflow {
                path: source.to_string(),
                line: counts_line_no,
                max: self.max_species,
            });
        }
        if raw_counts.is_empty() {
            return Err(lines.malformed("species counts", 1, 0));
        }
        let mut counts = Vec::with_capacity(raw_counts.len());
        for (i, &c) in raw_counts.iter().enumerate() {
            match usize::try_from(c) {
                Ok(c) => counts.push(c),
                Err(_) => {
                    return Err(lines.malformed("non-negative species count", raw_counts.len(), i))
                }
            }
        }

        // 模式行：Selective dynamics 只跳过一次
        let mut mode_line = lines.next_line("coordinate mode", 1)?;
        let selective = matches!(mode_line.chars().next(), Some('S' | 's'));
        if selective {
            mode_line = lines.next_line("coordinate mode", 1)?;
        }
        let mode = CoordinateMode::from_mode_line(mode_line);

        let num_atoms = counts
            .iter()
            .try_fold(0usize, |total, &c| total.checked_add(c))
            .ok_or_else(|| XtalCompError::AtomCountOverflow {
                path: source.to_string(),
                line: counts_line_no,
            })?;
        sink.record(format!("numAtoms: {}", num_atoms));

        // 笛卡尔 -> 分数: frac = (L^T)^-1 · cart
        let to_frac = match mode {
            CoordinateMode::Cartesian => Some(lattice.cart_to_frac_matrix().ok_or_else(|| {
                XtalCompError::SingularLattice {
                    path: source.to_string(),
                }
            })?),
            CoordinateMode::Direct => None,
        };

        // 声明的原子数来自文件，不能作为预分配大小；逐行读取，文件提前结束即报错
        let mut positions = Vec::new();
        for _ in 0..num_atoms {
            let (line, v) = lines.next_floats("atomic coordinates", 3)?;
            sink.record(format!("pos line: {}", line));
            record_xyz(sink, &v);

            let pos = match to_frac {
                Some(m) => {
                    let frac = m * Vector3::new(v[0], v[1], v[2]);
                    sink.record("Converted to fractional:".to_string());
                    record_xyz(sink, frac.as_slice());
                    [frac.x, frac.y, frac.z]
                }
                None => [v[0], v[1], v[2]],
            };
            positions.push(pos);
        }

        let structure =
            Structure::from_counts(name, lattice, counts, positions).with_source_layout(mode, selective);

        sink.record(format!("pos size: {}", structure.positions().len()));
        sink.record(format!("types size: {}", structure.types().len()));

        Ok(structure)
    }
}

fn record_xyz(sink: &mut dyn DiagnosticSink, v: &[f64]) {
    sink.record(format!("x: {:.6}", v[0]));
    sink.record(format!("y: {:.6}", v[1]));
    sink.record(format!("z: {:.6}", v[2]));
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn parse(content: &str) -> Result<Structure> {
        PoscarParser::default().parse_str(content, "test", &mut Vec::<String>::new())
    }

    #[test]
    fn test_parse_minimal_example() {
        let content = "cubic\n1.0\n1 0 0\n0 1 0\n0 0 1\n1\nDirect\n0.5 0.5 0.5\n";
        let s = parse(content).unwrap();

        assert_eq!(s.name(), "cubic");
        assert_eq!(
            s.lattice().matrix,
            [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]
        );
        assert_eq!(s.types(), &[0]);
        assert_eq!(s.positions(), &[[0.5, 0.5, 0.5]]);
        assert_eq!(s.mode(), CoordinateMode::Direct);
    }

    #[test]
    fn test_parse_poscar_nacl() {
        let content = r#"NaCl
1.0
5.64 0.0 0.0
0.0 5.64 0.0
0.0 0.0 5.64
4 4
Direct
0.0 0.0 0.0
0.5 0.5 0.0
0.5 0.0 0.5
0.0 0.5 0.5
0.5 0.0 0.0
0.0 0.5 0.0
0.0 0.0 0.5
0.5 0.5 0.5
"#;
        let s = parse(content).unwrap();
        assert_eq!(s.num_atoms(), 8);
        assert_eq!(s.types(), &[0, 0, 0, 0, 1, 1, 1, 1]);
        assert_eq!(s.species_counts(), &[4, 4]);
        assert_eq!(s.positions().len(), s.types().len());
    }

    #[test]
    fn test_parse_poscar_with_scale() {
        let content = "Si\n2.0\n2.0 0.0 0.0\n0.0 2.0 0.0\n0.0 0.0 2.0\n2\nDirect\n0 0 0\n0.25 0.25 0.25\n";
        let s = parse(content).unwrap();
        let (a, b, c, _, _, _) = s.lattice().parameters();

        // 2.0 * 2.0 = 4.0
        assert_abs_diff_eq!(a, 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(b, 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(c, 4.0, epsilon = 1e-12);
        // 分数坐标不受缩放影响
        assert_eq!(s.positions()[1], [0.25, 0.25, 0.25]);
    }

    #[test]
    fn test_negative_scale_is_literal_multiplier() {
        let content = "neg\n-2.0\n1 0 0\n0 1 0\n0 0 1\n1\nDirect\n0 0 0\n";
        let s = parse(content).unwrap();
        assert_eq!(s.lattice().matrix[0], [-2.0, -0.0, -0.0]);
        assert_abs_diff_eq!(s.lattice().volume(), -8.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_count_species_keeps_tag_order() {
        let content = "gap\n1.0\n1 0 0\n0 1 0\n0 0 1\n1 0 2\nDirect\n0 0 0\n0.1 0.1 0.1\n0.2 0.2 0.2\n";
        let s = parse(content).unwrap();
        assert_eq!(s.types(), &[0, 2, 2]);
    }

    #[test]
    fn test_trailing_content_is_tolerated() {
        let content = "junk\n1.0 scale\n3 0 0 ! a\n0 3 0 ! b\n0 0 3 ! c\n2 Si\nDirect\n0 0 0 Si1\n0.5 0.5 0.5 Si2\n";
        let s = parse(content).unwrap();
        assert_eq!(s.types(), &[0, 0]);
        assert_eq!(s.positions()[1], [0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_selective_dynamics_is_skipped() {
        let with_sd = "Fe\n1.0\n2.87 0.0 0.0\n0.0 2.87 0.0\n0.0 0.0 2.87\n2\nSelective dynamics\nDirect\n0.0 0.0 0.0 T T T\n0.5 0.5 0.5 F F F\n";
        let without_sd = "Fe\n1.0\n2.87 0.0 0.0\n0.0 2.87 0.0\n0.0 0.0 2.87\n2\nDirect\n0.0 0.0 0.0\n0.5 0.5 0.5\n";

        let a = parse(with_sd).unwrap();
        let b = parse(without_sd).unwrap();
        assert_eq!(a, b);
        assert!(a.selective_dynamics());
        assert!(!b.selective_dynamics());
    }

    #[test]
    fn test_selective_dynamics_then_cartesian() {
        let content = "sd\n1.0\n2 0 0\n0 2 0\n0 0 2\n1\nselective\nCartesian\n1.0 1.0 1.0 T T T\n";
        let s = parse(content).unwrap();
        assert_eq!(s.mode(), CoordinateMode::Cartesian);
        assert_abs_diff_eq!(s.positions()[0][0], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_cartesian_matches_direct() {
        let lattice = Lattice::from_vectors([[4.5, 0.0, 0.0], [1.2, 2.4, 0.0], [2.5, 6.4, 1.1]]);
        let fracs = [[0.1, 0.2, 0.3], [0.75, 0.5, 0.05]];

        let header = "tri\n1.0\n4.5 0.0 0.0\n1.2 2.4 0.0\n2.5 6.4 1.1\n1 1\n";
        let mut direct = format!("{}Direct\n", header);
        let mut cart = format!("{}Cartesian\n", header);
        for f in fracs {
            let c = lattice.frac_to_cart(f);
            direct.push_str(&format!("{} {} {}\n", f[0], f[1], f[2]));
            cart.push_str(&format!("{:.15} {:.15} {:.15}\n", c[0], c[1], c[2]));
        }

        let d = parse(&direct).unwrap();
        let c = parse(&cart).unwrap();
        assert_eq!(c.mode(), CoordinateMode::Cartesian);
        assert_eq!(d.lattice(), c.lattice());
        assert_eq!(d.types(), c.types());
        for (p, q) in d.positions().iter().zip(c.positions()) {
            for k in 0..3 {
                assert_abs_diff_eq!(p[k], q[k], epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_cartesian_uses_scaled_lattice() {
        let content = "k\n2.0\n1 0 0\n0 1 0\n0 0 1\n1\nkartesian\n1.0 0.5 1.5\n";
        let s = parse(content).unwrap();
        assert_abs_diff_eq!(s.positions()[0][0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(s.positions()[0][1], 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(s.positions()[0][2], 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_singular_lattice_in_cartesian_mode() {
        let content = "flat\n1.0\n1 0 0\n2 0 0\n0 0 1\n1\nCartesian\n0 0 0\n";
        assert!(matches!(
            parse(content),
            Err(XtalCompError::SingularLattice { .. })
        ));
    }

    #[test]
    fn test_short_lattice_line_fails() {
        let content = "bad\n1.0\n1 0 0\n0 1\n0 0 1\n1\nDirect\n0 0 0\n";
        match parse(content) {
            Err(XtalCompError::MalformedField {
                line,
                expected,
                found,
                ..
            }) => {
                assert_eq!(line, 4);
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_unparsable_scale_fails() {
        let content = "bad\nscale\n1 0 0\n0 1 0\n0 0 1\n1\nDirect\n0 0 0\n";
        assert!(matches!(
            parse(content),
            Err(XtalCompError::MalformedField { line: 2, .. })
        ));
    }

    #[test]
    fn test_short_coordinate_line_fails() {
        let content = "bad\n1.0\n1 0 0\n0 1 0\n0 0 1\n2\nDirect\n0 0 0\n0.5 0.5\n";
        assert!(matches!(
            parse(content),
            Err(XtalCompError::MalformedField { line: 9, found: 2, .. })
        ));
    }

    #[test]
    fn test_truncated_file_fails() {
        let content = "bad\n1.0\n1 0 0\n0 1 0\n0 0 1\n3\nDirect\n0 0 0\n";
        assert!(matches!(
            parse(content),
            Err(XtalCompError::MalformedField { line: 9, found: 0, .. })
        ));
        assert!(parse("").is_err());
        assert!(parse("only a comment\n").is_err());
    }

    #[test]
    fn test_species_ceiling() {
        let fifteen = vec!["1"; 15].join(" ");
        let sixteen = vec!["1"; 16].join(" ");
        let coords = "0 0 0\n".repeat(16);

        let ok = format!("s\n1.0\n1 0 0\n0 1 0\n0 0 1\n{}\nDirect\n{}", fifteen, coords);
        let s = parse(&ok).unwrap();
        assert_eq!(s.species_counts().len(), 15);
        assert_eq!(s.types()[14], 14);

        let too_many = format!("s\n1.0\n1 0 0\n0 1 0\n0 0 1\n{}\nDirect\n{}", sixteen, coords);
        assert!(matches!(
            parse(&too_many),
            Err(XtalCompError::SpeciesOverflow { line: 6, max: 15, .. })
        ));
    }

    #[test]
    fn test_configurable_species_ceiling() {
        let content = "s\n1.0\n1 0 0\n0 1 0\n0 0 1\n1 1 1\nDirect\n0 0 0\n0 0 0\n0 0 0\n";
        let parser = PoscarParser::new().with_max_species(2);
        assert!(matches!(
            parser.parse_str(content, "test", &mut Vec::<String>::new()),
            Err(XtalCompError::SpeciesOverflow { max: 2, .. })
        ));
        assert!(PoscarParser::new()
            .with_max_species(3)
            .parse_str(content, "test", &mut Vec::<String>::new())
            .is_ok());
    }

    #[test]
    fn test_species_line_with_trailing_junk() {
        let content = "s\n1.0\n1 0 0\n0 1 0\n0 0 1\n1 2 Na Cl\nDirect\n0 0 0\n0 0 0\n0 0 0\n";
        let s = parse(content).unwrap();
        assert_eq!(s.species_counts(), &[1, 2]);
    }

    #[test]
    fn test_element_symbol_header_is_rejected() {
        let content = "NaCl\n1.0\n1 0 0\n0 1 0\n0 0 1\nNa Cl\n1 1\nDirect\n0 0 0\n0.5 0.5 0.5\n";
        assert!(matches!(
            parse(content),
            Err(XtalCompError::MalformedField { line: 6, found: 0, .. })
        ));
    }

    #[test]
    fn test_negative_species_count_fails() {
        let content = "s\n1.0\n1 0 0\n0 1 0\n0 0 1\n2 -1\nDirect\n0 0 0\n";
        assert!(matches!(
            parse(content),
            Err(XtalCompError::MalformedField { line: 6, .. })
        ));
    }

    #[test]
    fn test_huge_count_on_truncated_file_fails_cleanly() {
        let content = "big\n1.0\n1 0 0\n0 1 0\n0 0 1\n100000000000000\nDirect\n0 0 0\n";
        assert!(matches!(
            parse(content),
            Err(XtalCompError::MalformedField { line: 9, found: 0, .. })
        ));
    }

    #[test]
    fn test_total_atom_count_overflow_fails() {
        let content = "big\n1.0\n1 0 0\n0 1 0\n0 0 1\n\
                       9223372036854775807 9223372036854775807 9223372036854775807\n\
                       Direct\n0 0 0\n";
        assert!(matches!(
            parse(content),
            Err(XtalCompError::AtomCountOverflow { line: 6, .. })
        ));
    }

    #[test]
    fn test_count_beyond_integer_range_stops_counts_line() {
        // 超出 i64 的字段无法解析，按非数值字段处理
        let content = "big\n1.0\n1 0 0\n0 1 0\n0 0 1\n99999999999999999999999\nDirect\n0 0 0\n";
        assert!(matches!(
            parse(content),
            Err(XtalCompError::MalformedField { line: 6, found: 0, .. })
        ));
    }

    #[test]
    fn test_unbounded_species_ceiling() {
        let content = "s\n1.0\n1 0 0\n0 1 0\n0 0 1\n1 1\nDirect\n0 0 0\n0.5 0.5 0.5\n";
        let s = PoscarParser::new()
            .with_max_species(usize::MAX)
            .parse_str(content, "test", &mut Vec::<String>::new())
            .unwrap();
        assert_eq!(s.types(), &[0, 1]);
    }

    #[test]
    fn test_adjacent_signed_coordinates() {
        let content = "adj\n1.0\n1 0 0\n0 1 0\n0 0 1\n1\nDirect\n0.5-0.25 0.1\n";
        let s = parse(content).unwrap();
        assert_eq!(s.positions(), &[[0.5, -0.25, 0.1]]);
    }

    #[test]
    fn test_non_utf8_comment_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("POSCAR");
        let mut bytes = b"Caf\xe9 \xc5 cell\n".to_vec();
        bytes.extend_from_slice(b"1.0\n2 0 0\n0 2 0\n0 0 2\n1\nDirect\n0.5 0.5 0.5\n");
        std::fs::write(&path, bytes).unwrap();

        let s = PoscarParser::new()
            .parse_file(&path, &mut Vec::<String>::new())
            .unwrap();
        assert!(s.name().starts_with("Caf"));
        assert_eq!(s.positions(), &[[0.5, 0.5, 0.5]]);
    }

    #[test]
    fn test_missing_file() {
        let err = PoscarParser::new()
            .parse_file(Path::new("/nonexistent/POSCAR"), &mut Vec::<String>::new())
            .unwrap_err();
        assert!(matches!(err, XtalCompError::FileReadError { .. }));
    }

    #[test]
    fn test_diagnostics_are_recorded() {
        let content = "d\n1.0\n1 0 0\n0 1 0\n0 0 1\n1\nCartesian\n0.5 0.5 0.5\n";
        let mut log: Vec<String> = Vec::new();
        PoscarParser::new().parse_str(content, "test", &mut log).unwrap();

        assert_eq!(log[0], "numAtoms: 1");
        assert!(log.contains(&"pos line: 0.5 0.5 0.5".to_string()));
        assert!(log.contains(&"Converted to fractional:".to_string()));
        assert_eq!(log.last().unwrap(), "types size: 1");
    }

    #[test]
    fn test_crlf_line_endings() {
        let content = "w\r\n1.0\r\n1 0 0\r\n0 1 0\r\n0 0 1\r\n1\r\nDirect\r\n0.5 0.5 0.5\r\n";
        let s = parse(content).unwrap();
        assert_eq!(s.positions(), &[[0.5, 0.5, 0.5]]);
    }
}
