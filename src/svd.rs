//! Dense singular value decomposition and truncation error.

use nalgebra::{DMatrix, DVector, SVD};

use crate::error::{Error, Result};

/// `A = U · diag(σ) · Vᵀ` with thin factors.
#[derive(Debug, Clone, PartialEq)]
pub struct SvdFactors {
    pub u: DMatrix<f64>,
    pub sigma: DVector<f64>,
    pub v_t: DMatrix<f64>,
}

impl SvdFactors {
    pub fn rank(&self) -> usize {
        self.sigma.len()
    }

    /// Keep the leading `k` triplets. Expects descending order.
    pub fn truncate(&self, k: usize) -> Result<Self> {
        if k == 0 || k > self.rank() {
            return Err(Error::InvalidRank {
                k,
                max: self.rank(),
            });
        }
        Ok(Self {
            u: self.u.columns(0, k).into_owned(),
            sigma: self.sigma.rows(0, k).into_owned(),
            v_t: self.v_t.rows(0, k).into_owned(),
        })
    }

    /// `U · diag(σ) · Vᵀ`.
    pub fn reconstruct(&self) -> DMatrix<f64> {
        &self.u * DMatrix::from_diagonal(&self.sigma) * &self.v_t
    }
}

/// Full thin SVD, singular values in whatever order the solver leaves them.
///
/// A matrix with no rows or no columns is rejected with [`Error::EmptyMatrix`].
pub fn full_svd_unordered(a: &DMatrix<f64>) -> Result<SvdFactors> {
    if a.is_empty() {
        return Err(Error::EmptyMatrix {
            rows: a.nrows(),
            cols: a.ncols(),
        });
    }
    let svd = SVD::try_new_unordered(a.clone(), true, true, f64::EPSILON, 0).ok_or(Error::SvdFailed)?;
    Ok(SvdFactors {
        u: svd.u.ok_or(Error::SvdFailed)?,
        sigma: svd.singular_values,
        v_t: svd.v_t.ok_or(Error::SvdFailed)?,
    })
}

/// Full thin SVD with singular values in descending order.
pub fn full_svd(a: &DMatrix<f64>) -> Result<SvdFactors> {
    full_svd_unordered(a).map(sort_descending)
}

/// Reorder singular triplets so σ is non-increasing.
///
/// One permutation is applied to σ, to the columns of `U` and to the rows of `Vᵀ`, so the
/// product is unchanged. Ties keep their relative order.
pub fn sort_descending(f: SvdFactors) -> SvdFactors {
    let n = f.sigma.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| f.sigma[b].total_cmp(&f.sigma[a]));

    let u = DMatrix::from_fn(f.u.nrows(), n, |i, j| f.u[(i, order[j])]);
    let v_t = DMatrix::from_fn(n, f.v_t.ncols(), |i, j| f.v_t[(order[i], j)]);
    let sigma = DVector::from_fn(n, |i, _| f.sigma[order[i]]);
    SvdFactors { u, sigma, v_t }
}

/// Frobenius error of the rank-`k` truncation: `sqrt(Σ_{i ≥ k} σᵢ²)`.
///
/// `sigma` must be in descending order. `k` past the end gives zero.
pub fn truncated_recon_err(sigma: &[f64], k: usize) -> f64 {
    sigma.iter().skip(k).map(|s| s * s).sum::<f64>().sqrt()
}
