//! # 晶格基约化
//!
//! 对行向量基做两两 Gauss/Lagrange 约化，得到较短、较正交的等价基，
//! 使得有限范围内的格点枚举能覆盖另一结构的基向量。
//!
//! ## 依赖关系
//! - 被 `compare/mod.rs` 使用
//! - 使用 `nalgebra`

use nalgebra::{Matrix3, RowVector3};

/// 体积低于此值视为奇异晶格
const DEGENERATE_VOLUME: f64 = 1e-10;

const MAX_SWEEPS: usize = 100;

/// 约化行向量基，结果按向量长度升序排列；奇异晶格返回 None
pub fn reduce_basis(basis: &Matrix3<f64>) -> Option<Matrix3<f64>> {
    if basis.determinant().abs() < DEGENERATE_VOLUME {
        return None;
    }

    let mut v = [basis.row(0).into_owned(), basis.row(1).into_owned(), basis.row(2).into_owned()];

    for _ in 0..MAX_SWEEPS {
        let mut changed = false;
        for i in 0..3 {
            for j in 0..3 {
                if i == j {
                    continue;
                }
                let k = (v[i].dot(&v[j]) / v[j].norm_squared()).round();
                if k == 0.0 {
                    continue;
                }
                let shorter: RowVector3<f64> = v[i] - v[j] * k;
                // 严格变短才替换，避免 mu = 0.5 时来回振荡
                if shorter.norm_squared() < v[i].norm_squared() * (1.0 - 1e-12) {
                    v[i] = shorter;
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }

    v.sort_by(|a, b| a.norm_squared().total_cmp(&b.norm_squared()));
    Some(Matrix3::from_rows(&v))
}
