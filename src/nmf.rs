//! Non-negative matrix factorization `X ≈ W · H`.
//!
//! Initialisation is NNDSVD (Boutsidis & Gallopoulos), so a run is fully deterministic.
//! Updates are the Lee & Seung multiplicative rules for the Frobenius loss.

use log::{debug, warn};
use nalgebra::DMatrix;

use crate::error::{Error, Result};
use crate::svd::full_svd;

/// Guards the multiplicative-update denominators.
const EPSILON: f64 = f64::EPSILON;
/// NNDSVD entries below this are zeroed.
const INIT_FLOOR: f64 = 1e-6;
/// Loss is evaluated every this many iterations.
const CHECK_EVERY: usize = 10;

/// Solver settings for one rank.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nmf {
    pub k: usize,
    pub max_iter: usize,
    pub tol: f64,
}

/// Output of [`Nmf::fit`].
#[derive(Debug, Clone)]
pub struct NmfFactors {
    /// documents × k
    pub w: DMatrix<f64>,
    /// k × terms
    pub h: DMatrix<f64>,
    /// `‖X - WH‖_F` at the last iteration.
    pub reconstruction_err: f64,
    pub n_iter: usize,
    /// False when `max_iter` ran out before the relative improvement dropped below `tol`.
    pub converged: bool,
}

impl Nmf {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iter: 1000,
            tol: 1e-4,
        }
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn fit(&self, x: &DMatrix<f64>) -> Result<NmfFactors> {
        if x.iter().any(|v| *v < 0.0) {
            return Err(Error::NegativeInput);
        }
        let max_rank = x.nrows().min(x.ncols());
        if self.k == 0 || self.k > max_rank {
            return Err(Error::InvalidRank {
                k: self.k,
                max: max_rank,
            });
        }

        let (mut w, mut h) = nndsvd(x, self.k)?;
        let error_at_init = frobenius_residual(x, &w, &h);
        if error_at_init == 0.0 {
            return Ok(NmfFactors {
                w,
                h,
                reconstruction_err: 0.0,
                n_iter: 0,
                converged: true,
            });
        }

        let mut previous_error = error_at_init;
        let mut n_iter = 0;
        let mut converged = false;
        while n_iter < self.max_iter {
            n_iter += 1;
            update_w(x, &mut w, &h);
            update_h(x, &w, &mut h);

            if self.tol > 0.0 && n_iter % CHECK_EVERY == 0 {
                let error = frobenius_residual(x, &w, &h);
                debug!("nmf k={} iter={} err={:.6}", self.k, n_iter, error);
                if (previous_error - error) / error_at_init < self.tol {
                    converged = true;
                    break;
                }
                previous_error = error;
            }
        }

        if !converged {
            warn!(
                "nmf k={} hit max_iter={} without reaching tol={}",
                self.k, self.max_iter, self.tol
            );
        }
        let reconstruction_err = frobenius_residual(x, &w, &h);
        Ok(NmfFactors {
            w,
            h,
            reconstruction_err,
            n_iter,
            converged,
        })
    }
}

/// `‖X - WH‖_F`.
pub fn frobenius_residual(x: &DMatrix<f64>, w: &DMatrix<f64>, h: &DMatrix<f64>) -> f64 {
    (x - w * h).norm()
}

// W ← W ∘ (X Hᵀ) ⊘ (W H Hᵀ)
fn update_w(x: &DMatrix<f64>, w: &mut DMatrix<f64>, h: &DMatrix<f64>) {
    let h_t = h.transpose();
    let numerator = x * &h_t;
    let denominator = (&*w * (h * &h_t)).add_scalar(EPSILON);
    w.component_mul_assign(&numerator.component_div(&denominator));
}

// H ← H ∘ (Wᵀ X) ⊘ (Wᵀ W H)
fn update_h(x: &DMatrix<f64>, w: &DMatrix<f64>, h: &mut DMatrix<f64>) {
    let w_t = w.transpose();
    let numerator = &w_t * x;
    let denominator = ((&w_t * w) * &*h).add_scalar(EPSILON);
    h.component_mul_assign(&numerator.component_div(&denominator));
}

/// Non-negative double SVD starting point.
fn nndsvd(x: &DMatrix<f64>, k: usize) -> Result<(DMatrix<f64>, DMatrix<f64>)> {
    let svd = full_svd(x)?.truncate(k)?;
    let (m, n) = x.shape();
    let mut w = DMatrix::zeros(m, k);
    let mut h = DMatrix::zeros(k, n);

    let lead = svd.sigma[0].sqrt();
    w.set_column(0, &(svd.u.column(0).abs() * lead));
    h.set_row(0, &(svd.v_t.row(0).abs() * lead));

    for j in 1..k {
        let x_col = svd.u.column(j);
        let y_row = svd.v_t.row(j);

        let x_p = x_col.map(|v| v.max(0.0));
        let x_n = x_col.map(|v| (-v).max(0.0));
        let y_p = y_row.map(|v| v.max(0.0));
        let y_n = y_row.map(|v| (-v).max(0.0));

        let (x_p_nrm, y_p_nrm) = (x_p.norm(), y_p.norm());
        let (x_n_nrm, y_n_nrm) = (x_n.norm(), y_n.norm());
        let m_p = x_p_nrm * y_p_nrm;
        let m_n = x_n_nrm * y_n_nrm;

        let (u, v, sigma) = if m_p > m_n {
            (x_p / x_p_nrm, y_p / y_p_nrm, m_p)
        } else if m_n > 0.0 {
            (x_n / x_n_nrm, y_n / y_n_nrm, m_n)
        } else {
            continue;
        };
        let lbd = (svd.sigma[j] * sigma).sqrt();
        w.set_column(j, &(u * lbd));
        h.set_row(j, &(v * lbd));
    }

    w.apply(|v| {
        if *v < INIT_FLOOR {
            *v = 0.0
        }
    });
    h.apply(|v| {
        if *v < INIT_FLOOR {
            *v = 0.0
        }
    });
    Ok((w, h))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two obvious blocks: docs 0-1 use terms 0-1, docs 2-3 use terms 2-3.
    fn blocks() -> DMatrix<f64> {
        DMatrix::from_row_slice(
            4,
            4,
            &[
                3.0, 2.0, 0.0, 0.0, //
                2.0, 3.0, 0.0, 0.0, //
                0.0, 0.0, 1.0, 2.0, //
                0.0, 0.0, 2.0, 1.0,
            ],
        )
    }

    fn argmax_row(m: &DMatrix<f64>, r: usize) -> usize {
        (0..m.ncols())
            .max_by(|&a, &b| m[(r, a)].partial_cmp(&m[(r, b)]).unwrap())
            .unwrap()
    }

    #[test]
    fn factors_are_non_negative_with_expected_shapes() {
        let f = Nmf::new(2).fit(&blocks()).unwrap();
        assert_eq!(f.w.shape(), (4, 2));
        assert_eq!(f.h.shape(), (2, 4));
        assert!(f.w.iter().all(|v| *v >= 0.0));
        assert!(f.h.iter().all(|v| *v >= 0.0));
        assert!(f.n_iter <= 1000);
    }

    #[test]
    fn recovers_block_structure() {
        let x = blocks();
        let f = Nmf::new(2).fit(&x).unwrap();
        assert_eq!(argmax_row(&f.w, 0), argmax_row(&f.w, 1));
        assert_eq!(argmax_row(&f.w, 2), argmax_row(&f.w, 3));
        assert_ne!(argmax_row(&f.w, 0), argmax_row(&f.w, 2));
        assert!((f.reconstruction_err - frobenius_residual(&x, &f.w, &f.h)).abs() < 1e-12);
    }

    #[test]
    fn error_shrinks_with_rank() {
        let x = blocks();
        let e1 = Nmf::new(1).fit(&x).unwrap().reconstruction_err;
        let e2 = Nmf::new(2).fit(&x).unwrap().reconstruction_err;
        assert!(e2 < e1);
    }

    #[test]
    fn iteration_cap_reported_as_non_convergence() {
        let f = Nmf::new(2).with_max_iter(3).fit(&blocks()).unwrap();
        assert_eq!(f.n_iter, 3);
        assert!(!f.converged);
    }

    #[test]
    fn rejects_bad_rank_and_negative_input() {
        assert!(matches!(
            Nmf::new(5).fit(&blocks()),
            Err(Error::InvalidRank { k: 5, max: 4 })
        ));
        assert!(matches!(Nmf::new(0).fit(&blocks()), Err(Error::InvalidRank { .. })));
        let mut neg = blocks();
        neg[(0, 0)] = -1.0;
        assert!(matches!(Nmf::new(1).fit(&neg), Err(Error::NegativeInput)));
    }

    #[test]
    fn deterministic() {
        let a = Nmf::new(2).fit(&blocks()).unwrap();
        let b = Nmf::new(2).fit(&blocks()).unwrap();
        assert_eq!(a.w, b.w);
        assert_eq!(a.h, b.h);
    }
}
