//! Small dense symmetric linear algebra for the ICA stage.
//!
//! Matrices here are channel-sized (≈ 12 × 12), so a cyclic Jacobi sweep is
//! plenty and keeps the crate free of BLAS/LAPACK.
use ndarray::{Array1, Array2};

const MAX_SWEEPS: usize = 100;

/// Eigendecomposition of a symmetric matrix.
///
/// Returns `(values, vectors)` sorted by descending eigenvalue; column `i`
/// of `vectors` belongs to `values[i]`.
pub fn symmetric_eigen(a: &Array2<f64>) -> (Array1<f64>, Array2<f64>) {
    let n = a.nrows();
    let mut a = a.clone();
    let mut v = Array2::<f64>::eye(n);

    let total: f64 = a.iter().map(|x| x * x).sum();
    for _ in 0..MAX_SWEEPS {
        let off: f64 = (0..n)
            .flat_map(|p| (p + 1..n).map(move |q| (p, q)))
            .map(|(p, q)| a[[p, q]] * a[[p, q]])
            .sum();
        if off <= total * 1e-30 {
            break;
        }
        for p in 0..n {
            for q in p + 1..n {
                let apq = a[[p, q]];
                if apq == 0.0 {
                    continue;
                }
                let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + theta.hypot(1.0));
                let c = 1.0 / t.hypot(1.0);
                let s = t * c;
                rotate(&mut a, &mut v, p, q, c, s);
            }
        }
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| a[[j, j]].total_cmp(&a[[i, i]]));

    let values = Array1::from_iter(order.iter().map(|&i| a[[i, i]]));
    let mut vectors = Array2::<f64>::zeros((n, n));
    for (dst, &src) in order.iter().enumerate() {
        vectors.column_mut(dst).assign(&v.column(src));
    }
    (values, vectors)
}

/// `a ← Jᵀ a J`, `v ← v J` for the Givens rotation in the `(p, q)` plane.
fn rotate(a: &mut Array2<f64>, v: &mut Array2<f64>, p: usize, q: usize, c: f64, s: f64) {
    let n = a.nrows();
    for k in 0..n {
        let (akp, akq) = (a[[k, p]], a[[k, q]]);
        a[[k, p]] = c * akp - s * akq;
        a[[k, q]] = s * akp + c * akq;
    }
    for k in 0..n {
        let (apk, aqk) = (a[[p, k]], a[[q, k]]);
        a[[p, k]] = c * apk - s * aqk;
        a[[q, k]] = s * apk + c * aqk;
    }
    for k in 0..n {
        let (vkp, vkq) = (v[[k, p]], v[[k, q]]);
        v[[k, p]] = c * vkp - s * vkq;
        v[[k, q]] = s * vkp + c * vkq;
    }
}

/// Symmetric decorrelation: `w ← (w wᵀ)^{-1/2} w`.
pub fn sym_decorrelate(w: &Array2<f64>) -> Array2<f64> {
    let (s, u) = symmetric_eigen(&w.dot(&w.t()));
    let inv_sqrt = s.mapv(|v| 1.0 / v.max(f64::MIN_POSITIVE).sqrt());
    let scaled = &u * &inv_sqrt.insert_axis(ndarray::Axis(0));
    scaled.dot(&u.t()).dot(w)
}
