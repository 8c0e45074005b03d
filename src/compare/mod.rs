//! # 结构比较模块
//!
//! 判断两个周期性结构在容差内是否等距（旋转/反演 + 平移 + 晶格基选择）。
//!
//! ## 算法
//! 1. 原子总数和每种标签的数量必须一致
//! 2. 两个晶格分别做基约化
//! 3. 在结构 2 的格点中枚举长度、夹角与结构 1 约化基匹配的向量三元组，
//!    且系数矩阵为幺模矩阵，由此得到候选旋转 R
//! 4. 把结构 1 中最少种类的第一个原子依次钉到结构 2 的同种原子上得到平移 t，
//!    检查所有原子都能在周期意义下一一对应
//!
//! ## 依赖关系
//! - 被 `commands/compare.rs` 使用
//! - 使用 `models/`, `nalgebra`
//! - 子模块: reduce

pub mod reduce;

use crate::models::{Comparison, Structure, Tolerances, Transform};
use reduce::reduce_basis;

use nalgebra::{Matrix3, RowVector3, Vector3};
use std::collections::BTreeMap;

/// 结构比较器接口
pub trait StructureComparator {
    fn compare(&self, first: &Structure, second: &Structure, tol: &Tolerances) -> Comparison;
}

/// 结构 2 中的一个候选格点向量
#[derive(Debug, Clone, Copy)]
struct LatticePoint {
    coeffs: [i32; 3],
    vector: RowVector3<f64>,
    length: f64,
}

/// 格点枚举的整数系数范围 [-SEARCH_RANGE, SEARCH_RANGE]
const SEARCH_RANGE: i32 = 2;

/// 暴力等距搜索
#[derive(Debug, Default, Clone, Copy)]
pub struct IsometrySearch;

impl IsometrySearch {
    pub fn new() -> Self {
        IsometrySearch
    }

    fn lattice_points(&self, basis: &Matrix3<f64>) -> Vec<LatticePoint> {
        let r = SEARCH_RANGE;
        let mut points = Vec::new();
        for i in -r..=r {
            for j in -r..=r {
                for k in -r..=r {
                    if i == 0 && j == 0 && k == 0 {
                        continue;
                    }
                    let vector = basis.row(0) * f64::from(i)
                        + basis.row(1) * f64::from(j)
                        + basis.row(2) * f64::from(k);
                    points.push(LatticePoint {
                        coeffs: [i, j, k],
                        length: vector.norm(),
                        vector,
                    });
                }
            }
        }
        points
    }

    /// 所有长度、夹角都匹配的候选旋转
    fn candidate_rotations(
        &self,
        basis1: &Matrix3<f64>,
        basis2: &Matrix3<f64>,
        tol: &Tolerances,
    ) -> Vec<Matrix3<f64>> {
        let Some(inv1) = basis1.transpose().try_inverse() else {
            return Vec::new();
        };
        let points = self.lattice_points(basis2);

        let targets: Vec<RowVector3<f64>> = (0..3).map(|i| basis1.row(i).into_owned()).collect();
        let candidates: Vec<Vec<&LatticePoint>> = targets
            .iter()
            .map(|t| {
                let len = t.norm();
                let mut c: Vec<&LatticePoint> = points
                    .iter()
                    .filter(|p| (p.length - len).abs() <= tol.cart)
                    .collect();
                c.sort_by(|a, b| {
                    (a.length - len)
                        .abs()
                        .total_cmp(&(b.length - len).abs())
                        .then_with(|| l1(&a.coeffs).cmp(&l1(&b.coeffs)))
                });
                c
            })
            .collect();

        let angle_ab = angle_deg(&targets[0], &targets[1]);
        let angle_ac = angle_deg(&targets[0], &targets[2]);
        let angle_bc = angle_deg(&targets[1], &targets[2]);

        let mut rotations = Vec::new();
        for u in &candidates[0] {
            for v in &candidates[1] {
                if (angle_deg(&u.vector, &v.vector) - angle_ab).abs() > tol.angle {
                    continue;
                }
                for w in &candidates[2] {
                    if (angle_deg(&u.vector, &w.vector) - angle_ac).abs() > tol.angle
                        || (angle_deg(&v.vector, &w.vector) - angle_bc).abs() > tol.angle
                    {
                        continue;
                    }
                    if det3(&u.coeffs, &v.coeffs, &w.coeffs).abs() != 1 {
                        continue;
                    }
                    // R · [a b c] = [u v w]（列向量）
                    let image = Matrix3::from_rows(&[u.vector, v.vector, w.vector]).transpose();
                    rotations.push(image * inv1);
                }
            }
        }
        rotations
    }
}

impl StructureComparator for IsometrySearch {
    fn compare(&self, first: &Structure, second: &Structure, tol: &Tolerances) -> Comparison {
        if first.num_atoms() != second.num_atoms()
            || tag_counts(first.types()) != tag_counts(second.types())
        {
            log::debug!("composition differs, skipping isometry search");
            return Comparison::no_match();
        }

        let (Some(basis1), Some(basis2)) = (
            reduce_basis(&first.lattice().to_matrix()),
            reduce_basis(&second.lattice().to_matrix()),
        ) else {
            log::debug!("singular lattice, structures cannot be compared");
            return Comparison::no_match();
        };
        let Some(cell2) = PeriodicCell::new(&basis2) else {
            return Comparison::no_match();
        };

        let cart1 = first.cartesian_positions();
        let cart2 = second.cartesian_positions();

        let rotations = self.candidate_rotations(&basis1, &basis2, tol);
        log::debug!("{} candidate rotation(s)", rotations.len());

        let anchor = anchor_atom(first.types());

        for rotation in &rotations {
            let mapped: Vec<Vector3<f64>> = cart1.iter().map(|p| rotation * p).collect();

            let translations: Vec<Vector3<f64>> = match anchor {
                Some(a) => (0..second.num_atoms())
                    .filter(|&j| second.types()[j] == first.types()[a])
                    .map(|j| cart2[j] - mapped[a])
                    .collect(),
                None => vec![Vector3::zeros()],
            };

            for t in translations {
                if atoms_correspond(&mapped, first.types(), &cart2, second.types(), &t, &cell2, tol.cart)
                {
                    return Comparison::matched(Transform::new(rotation, &t));
                }
            }
        }

        Comparison::no_match()
    }
}

/// 用于周期性最近像距离的晶胞
pub struct PeriodicCell {
    to_cart: Matrix3<f64>,
    to_frac: Matrix3<f64>,
}

impl PeriodicCell {
    /// `basis` 为行向量基
    pub fn new(basis: &Matrix3<f64>) -> Option<Self> {
        let to_cart = basis.transpose();
        let to_frac = to_cart.try_inverse()?;
        Some(PeriodicCell { to_cart, to_frac })
    }

    /// 两点在周期边界条件下的最短距离
    pub fn distance(&self, a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
        let mut d = self.to_frac * (a - b);
        d.apply(|x| *x = *x - x.round());

        // 约化后的基上，最近像一定在相邻的 27 个像之内
        let mut best = f64::INFINITY;
        for i in -1..=1 {
            for j in -1..=1 {
                for k in -1..=1 {
                    let shifted = d + Vector3::new(f64::from(i), f64::from(j), f64::from(k));
                    best = best.min((self.to_cart * shifted).norm());
                }
            }
        }
        best
    }
}

/// 每个标签出现的次数
fn tag_counts(types: &[usize]) -> BTreeMap<usize, usize> {
    let mut counts = BTreeMap::new();
    for &t in types {
        *counts.entry(t).or_insert(0) += 1;
    }
    counts
}

/// 数量最少的种类中的第一个原子
fn anchor_atom(types: &[usize]) -> Option<usize> {
    let counts = tag_counts(types);
    let (&rarest, _) = counts.iter().min_by_key(|&(_, n)| *n)?;
    types.iter().position(|&t| t == rarest)
}

/// 贪心地为每个映射后的原子寻找最近的、未使用的同种原子
fn atoms_correspond(
    mapped: &[Vector3<f64>],
    types1: &[usize],
    cart2: &[Vector3<f64>],
    types2: &[usize],
    translation: &Vector3<f64>,
    cell: &PeriodicCell,
    cart_tol: f64,
) -> bool {
    let mut used = vec![false; cart2.len()];

    for (p, &tag) in mapped.iter().zip(types1) {
        let q = p + translation;
        let best = (0..cart2.len())
            .filter(|&j| !used[j] && types2[j] == tag)
            .map(|j| (j, cell.distance(&q, &cart2[j])))
            .min_by(|a, b| a.1.total_cmp(&b.1));

        match best {
            Some((j, d)) if d <= cart_tol => used[j] = true,
            _ => return false,
        }
    }
    true
}

fn angle_deg(a: &RowVector3<f64>, b: &RowVector3<f64>) -> f64 {
    let cos = a.dot(b) / (a.norm() * b.norm());
    cos.clamp(-1.0, 1.0).acos().to_degrees()
}

fn l1(c: &[i32; 3]) -> i32 {
    c.iter().map(|x| x.abs()).sum()
}

fn det3(a: &[i32; 3], b: &[i32; 3], c: &[i32; 3]) -> i32 {
    a[0] * (b[1] * c[2] - b[2] * c[1]) - a[1] * (b[0] * c[2] - b[2] * c[0])
        + a[2] * (b[0] * c[1] - b[1] * c[0])
}
