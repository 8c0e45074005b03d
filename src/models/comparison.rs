//! # 比较结果数据模型
//!
//! 比较容差、刚性变换矩阵和比较结果。
//!
//! ## 依赖关系
//! - 被 `compare/`, `commands/`, `report/` 使用

use nalgebra::{Matrix3, Vector3};
use serde::Serialize;

/// 默认笛卡尔容差 (Å)
pub const DEFAULT_CART_TOL: f64 = 0.05;

/// 默认角度容差 (°)
pub const DEFAULT_ANGLE_TOL: f64 = 0.25;

/// 比较容差
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tolerances {
    /// 笛卡尔距离容差 (Å)
    pub cart: f64,
    /// 角度容差 (°)
    pub angle: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Tolerances {
            cart: DEFAULT_CART_TOL,
            angle: DEFAULT_ANGLE_TOL,
        }
    }
}

/// 4x4 刚性变换：左上 3x3 为旋转（可含反演），第 4 列为平移
///
/// 结构 1 的笛卡尔坐标 p 映射为 R·p + t（模结构 2 的晶格）。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform(pub [[f64; 4]; 4]);

impl Transform {
    pub fn new(rotation: &Matrix3<f64>, translation: &Vector3<f64>) -> Self {
        let mut m = [[0.0; 4]; 4];
        for i in 0..3 {
            for j in 0..3 {
                m[i][j] = rotation[(i, j)];
            }
            m[i][3] = translation[i];
        }
        m[3][3] = 1.0;
        Transform(m)
    }

    pub fn rotation(&self) -> Matrix3<f64> {
        Matrix3::from_fn(|i, j| self.0[i][j])
    }

    /// 旋转部分行列式为负时包含反演
    pub fn is_proper(&self) -> bool {
        self.rotation().determinant() > 0.0
    }
}

/// 比较结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub matched: bool,
    /// 仅在匹配时存在
    pub transform: Option<Transform>,
}

impl Comparison {
    pub fn no_match() -> Self {
        Comparison {
            matched: false,
            transform: None,
        }
    }

    pub fn matched(transform: Transform) -> Self {
        Comparison {
            matched: true,
            transform: Some(transform),
        }
    }
}
