//! Dense solvers for the normal equations.

use crate::{Matrix, Vector};

const MAX_JACOBI_SWEEPS: usize = 100;

/// Returned by [`solve`] when elimination meets a (numerically) zero pivot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SingularMatrix;

/// Solves the square system `a x = b` by Gaussian elimination with partial
/// pivoting.
///
/// A pivot is treated as zero when its magnitude falls below
/// `n * eps * max|a_ij|`.
pub(crate) fn solve(a: &Matrix, b: &Vector) -> Result<Vector, SingularMatrix> {
    let n = a.nrows();
    let mut aug = Matrix::zeros((n, n + 1));
    aug.slice_mut(ndarray::s![.., ..n]).assign(a);
    aug.column_mut(n).assign(b);

    let scale = a.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let tolerance = n as f64 * f64::EPSILON * scale;

    for i in 0..n {
        let mut max_row = i;
        for k in (i + 1)..n {
            if aug[(k, i)].abs() > aug[(max_row, i)].abs() {
                max_row = k;
            }
        }

        if aug[(max_row, i)].abs() <= tolerance {
            return Err(SingularMatrix);
        }

        if max_row != i {
            for j in 0..=n {
                aug.swap((i, j), (max_row, j));
            }
        }

        for k in (i + 1)..n {
            let factor = aug[(k, i)] / aug[(i, i)];
            for j in i..=n {
                aug[(k, j)] -= factor * aug[(i, j)];
            }
        }
    }

    let mut x = Vector::zeros(n);
    for i in (0..n).rev() {
        x[i] = aug[(i, n)];
        for j in (i + 1)..n {
            x[i] -= aug[(i, j)] * x[j];
        }
        x[i] /= aug[(i, i)];
    }

    Ok(x)
}

/// Minimum-norm least-squares solution of `design w ≈ y`.
///
/// Uses the eigendecomposition of `designᵗ design`; eigenvalues below
/// `eps * max(n, p) * λ_max` are treated as zero, so rank-deficient designs
/// give the solution with the smallest norm.
pub(crate) fn lstsq(design: &Matrix, y: &Vector) -> Vector {
    let gram = design.t().dot(design);
    let rhs = design.t().dot(y);
    let (eigenvalues, eigenvectors) = symmetric_eigen(&gram);

    let lambda_max = eigenvalues.iter().fold(0.0_f64, |acc, v| acc.max(*v));
    let cutoff = f64::EPSILON * design.nrows().max(design.ncols()) as f64 * lambda_max;

    let projected = eigenvectors.t().dot(&rhs);
    let scaled = projected
        .iter()
        .zip(eigenvalues.iter())
        .map(|(&p, &lambda)| if lambda > cutoff { p / lambda } else { 0.0 })
        .collect::<Vector>();

    eigenvectors.dot(&scaled)
}

/// Cyclic Jacobi eigendecomposition of a symmetric matrix.
///
/// Returns the eigenvalues and the matrix whose columns are the matching
/// orthonormal eigenvectors.
pub(crate) fn symmetric_eigen(matrix: &Matrix) -> (Vector, Matrix) {
    let n = matrix.nrows();
    let mut a = matrix.clone();
    let mut v = Matrix::eye(n);

    let total = a.iter().map(|x| x * x).sum::<f64>().sqrt();

    for _ in 0..MAX_JACOBI_SWEEPS {
        let mut off = 0.0;
        for p in 0..n {
            for q in (p + 1)..n {
                off += a[(p, q)] * a[(p, q)];
            }
        }
        if off.sqrt() <= f64::EPSILON * total {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[(p, q)];
                if apq == 0.0 {
                    continue;
                }
                let theta = (a[(q, q)] - a[(p, p)]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for k in 0..n {
                    let akp = a[(k, p)];
                    let akq = a[(k, q)];
                    a[(k, p)] = c * akp - s * akq;
                    a[(k, q)] = s * akp + c * akq;
                }
                for k in 0..n {
                    let apk = a[(p, k)];
                    let aqk = a[(q, k)];
                    a[(p, k)] = c * apk - s * aqk;
                    a[(q, k)] = s * apk + c * aqk;
                }
                for k in 0..n {
                    let vkp = v[(k, p)];
                    let vkq = v[(k, q)];
                    v[(k, p)] = c * vkp - s * vkq;
                    v[(k, q)] = s * vkp + c * vkq;
                }
            }
        }
    }

    (a.diag().to_owned(), v)
}
