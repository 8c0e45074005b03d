//! # 晶体结构数据模型
//!
//! 比较程序使用的结构表示：晶格 + 分数坐标 + 种类标签。
//! 结构由解析器一次性构造，之后只读。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `compare/`, `report/` 使用
//! - 使用 `nalgebra` 做矩阵求逆

use nalgebra::{Matrix3, Vector3};
use serde::Serialize;

/// 晶格参数表示
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Lattice {
    /// 晶格向量矩阵 (3x3)，行向量表示 a, b, c
    /// [[a1, a2, a3], [b1, b2, b3], [c1, c2, c3]]
    pub matrix: [[f64; 3]; 3],
}

impl Lattice {
    /// 从晶格向量矩阵创建
    pub fn from_vectors(matrix: [[f64; 3]; 3]) -> Self {
        Lattice { matrix }
    }

    /// 每个元素乘以缩放因子
    pub fn scaled(&self, scale: f64) -> Self {
        let mut matrix = self.matrix;
        for row in matrix.iter_mut() {
            for v in row.iter_mut() {
                *v *= scale;
            }
        }
        Lattice { matrix }
    }

    /// 行向量矩阵
    pub fn to_matrix(&self) -> Matrix3<f64> {
        let m = self.matrix;
        Matrix3::new(
            m[0][0], m[0][1], m[0][2], //
            m[1][0], m[1][1], m[1][2], //
            m[2][0], m[2][1], m[2][2],
        )
    }

    /// 笛卡尔 -> 分数坐标的变换矩阵 (L^T)^-1，晶格奇异时返回 None
    pub fn cart_to_frac_matrix(&self) -> Option<Matrix3<f64>> {
        self.to_matrix().transpose().try_inverse()
    }

    /// 分数坐标转笛卡尔坐标: cart = L^T · frac
    pub fn frac_to_cart(&self, frac: [f64; 3]) -> [f64; 3] {
        let v = self.to_matrix().transpose() * Vector3::from(frac);
        [v.x, v.y, v.z]
    }

    /// 晶格参数 (a, b, c, alpha, beta, gamma)，角度单位为度
    pub fn parameters(&self) -> (f64, f64, f64, f64, f64, f64) {
        let m = self.to_matrix();
        let (a, b, c) = (m.row(0), m.row(1), m.row(2));
        (
            a.norm(),
            b.norm(),
            c.norm(),
            b.angle(&c).to_degrees(),
            a.angle(&c).to_degrees(),
            a.angle(&b).to_degrees(),
        )
    }

    /// 计算晶格体积（带符号）
    pub fn volume(&self) -> f64 {
        self.to_matrix().determinant()
    }
}

/// 坐标行的解释方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateMode {
    /// 分数坐标，原样保存
    Direct,
    /// 笛卡尔坐标，需要转换为分数坐标
    Cartesian,
}

impl CoordinateMode {
    /// 由模式行首字符决定：[KkCc] 为笛卡尔，其余（含空行）为分数
    pub fn from_mode_line(line: &str) -> Self {
        match line.chars().next() {
            Some('K' | 'k' | 'C' | 'c') => CoordinateMode::Cartesian,
            _ => CoordinateMode::Direct,
        }
    }
}

/// 将每种原子的数量展开为按文件顺序的种类标签
pub fn expand_type_tags(counts: &[usize]) -> Vec<usize> {
    counts
        .iter()
        .enumerate()
        .flat_map(|(tag, &count)| std::iter::repeat(tag).take(count))
        .collect()
}

/// 晶体结构
///
/// `positions` 始终为分数坐标，`types[i]` 是原子 i 的种类标签。
/// 相等性只比较晶格、坐标和标签，来源元数据（名称、模式行）不参与。
#[derive(Debug, Clone, Serialize)]
pub struct Structure {
    name: String,
    lattice: Lattice,
    positions: Vec<[f64; 3]>,
    types: Vec<usize>,
    species_counts: Vec<usize>,
    mode: CoordinateMode,
    selective_dynamics: bool,
}

impl Structure {
    /// 由每种原子数量构造，`positions.len()` 必须等于数量之和
    pub fn from_counts(
        name: impl Into<String>,
        lattice: Lattice,
        species_counts: Vec<usize>,
        positions: Vec<[f64; 3]>,
    ) -> Self {
        let types = expand_type_tags(&species_counts);
        debug_assert_eq!(types.len(), positions.len(), "one position per declared atom");
        Structure {
            name: name.into(),
            lattice,
            positions,
            types,
            species_counts,
            mode: CoordinateMode::Direct,
            selective_dynamics: false,
        }
    }

    /// 记录来源文件中的坐标模式与 Selective dynamics 标记
    pub(crate) fn with_source_layout(mut self, mode: CoordinateMode, selective: bool) -> Self {
        self.mode = mode;
        self.selective_dynamics = selective;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// 分数坐标
    pub fn positions(&self) -> &[[f64; 3]] {
        &self.positions
    }

    pub fn types(&self) -> &[usize] {
        &self.types
    }

    pub fn species_counts(&self) -> &[usize] {
        &self.species_counts
    }

    pub fn mode(&self) -> CoordinateMode {
        self.mode
    }

    pub fn selective_dynamics(&self) -> bool {
        self.selective_dynamics
    }

    pub fn num_atoms(&self) -> usize {
        self.positions.len()
    }

    /// 所有原子的笛卡尔坐标
    pub fn cartesian_positions(&self) -> Vec<Vector3<f64>> {
        self.positions
            .iter()
            .map(|&p| Vector3::from(self.lattice.frac_to_cart(p)))
            .collect()
    }
}

impl PartialEq for Structure {
    fn eq(&self, other: &Self) -> bool {
        self.lattice == other.lattice
            && self.positions == other.positions
            && self.types == other.types
    }
}
