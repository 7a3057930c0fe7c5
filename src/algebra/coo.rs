#![allow(non_snake_case)]

use crate::algebra::{CscMatrix, MumpsScalar, ShapedMatrix, SparseFormatError};
use itertools::izip;
use std::collections::BTreeMap;

/// default tolerance of [`CooMatrix::is_symmetric`]
pub const SYMMETRY_TOL: f64 = 1e-9;

/// Sparse matrix in coordinate (triplet) format.
///
/// Indices are 0-based.  Repeated `(row, col)` pairs are allowed and
/// are summed, which is also how MUMPS treats them on assembly.
///
/// ```no_run
/// use mumpsrs::algebra::CooMatrix;
///
/// // A = [4. 1.]
/// //     [1. 3.]
/// let A = CooMatrix::new(
///     2,                    // m
///     2,                    // n
///     vec![0, 1, 0, 1],     // rows
///     vec![0, 0, 1, 1],     // cols
///     vec![4., 1., 1., 3.], // vals
/// ).unwrap();
///
/// assert!(A.is_symmetric(1e-12));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CooMatrix<T = f64> {
    /// number of rows
    pub m: usize,
    /// number of columns
    pub n: usize,
    /// row index of each entry
    pub rows: Vec<usize>,
    /// column index of each entry
    pub cols: Vec<usize>,
    /// entry values
    pub vals: Vec<T>,
}

impl<T> CooMatrix<T>
where
    T: MumpsScalar,
{
    /// `CooMatrix` constructor.  Checks that the three arrays have the same
    /// length and that every index is within the matrix dimensions.
    pub fn new(
        m: usize,
        n: usize,
        rows: Vec<usize>,
        cols: Vec<usize>,
        vals: Vec<T>,
    ) -> Result<Self, SparseFormatError> {
        if rows.len() != cols.len() || rows.len() != vals.len() {
            return Err(SparseFormatError::IncompatibleDimension);
        }
        if rows.iter().any(|&r| r >= m) {
            return Err(SparseFormatError::BadRowval);
        }
        if cols.iter().any(|&c| c >= n) {
            return Err(SparseFormatError::BadColval);
        }
        Ok(Self {
            m,
            n,
            rows,
            cols,
            vals,
        })
    }

    /// number of stored entries, duplicates included
    pub fn nnz(&self) -> usize {
        self.vals.len()
    }

    /// transpose
    pub fn transpose(&self) -> Self {
        Self {
            m: self.n,
            n: self.m,
            rows: self.cols.clone(),
            cols: self.rows.clone(),
            vals: self.vals.clone(),
        }
    }

    /// Entries of `A - Aᵀ` with duplicates summed and exact zeros dropped.
    fn skew_part(&self) -> Vec<T> {
        let mut diff: BTreeMap<(usize, usize), T> = BTreeMap::new();
        for (&r, &c, &v) in izip!(&self.rows, &self.cols, &self.vals) {
            let e = diff.entry((r, c)).or_insert_with(T::zero);
            *e = *e + v;
            let e = diff.entry((c, r)).or_insert_with(T::zero);
            *e = *e - v;
        }
        diff.into_values().filter(|v| !v.is_zero()).collect()
    }

    /// Check for numerical symmetry.
    ///
    /// The matrix is symmetric if `A - Aᵀ` has no stored entries, or if
    /// every entry of `A - Aᵀ` is smaller in magnitude than `tol`, or
    /// smaller than `tol` times the 2-norm of the stored values.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        if !self.is_square() {
            return false;
        }

        let skew = self.skew_part();
        if skew.is_empty() || skew.iter().all(|v| v.magnitude() < tol) {
            return true;
        }

        let norm = self
            .vals
            .iter()
            .map(|v| v.magnitude().powi(2))
            .sum::<f64>()
            .sqrt();

        skew.iter().all(|v| v.magnitude() < tol * norm)
    }

    /// Allocates a new matrix containing only entries with `col >= row`
    pub fn upper_triangle(&self) -> Self {
        let mut U = Self {
            m: self.m,
            n: self.n,
            rows: Vec::new(),
            cols: Vec::new(),
            vals: Vec::new(),
        };
        for (&r, &c, &v) in izip!(&self.rows, &self.cols, &self.vals) {
            if c >= r {
                U.rows.push(r);
                U.cols.push(c);
                U.vals.push(v);
            }
        }
        U
    }

    /// 1-based 32 bit row and column indices, as MUMPS expects them.
    pub fn to_one_based_i32(&self) -> Result<(Vec<i32>, Vec<i32>), SparseFormatError> {
        Ok((to_one_based(&self.rows)?, to_one_based(&self.cols)?))
    }
}

fn to_one_based(idx: &[usize]) -> Result<Vec<i32>, SparseFormatError> {
    idx.iter()
        .map(|&i| {
            i.checked_add(1)
                .and_then(|j| i32::try_from(j).ok())
                .ok_or(SparseFormatError::IndexOverflow(i))
        })
        .collect()
}

impl<T> ShapedMatrix for CooMatrix<T> {
    fn nrows(&self) -> usize {
        self.m
    }
    fn ncols(&self) -> usize {
        self.n
    }
}

impl<T> TryFrom<&CscMatrix<T>> for CooMatrix<T>
where
    T: MumpsScalar,
{
    type Error = SparseFormatError;

    /// Expand the column pointers of `A` into one column index per entry.
    /// Fails unless `A` passes [`CscMatrix::check_format`].
    fn try_from(A: &CscMatrix<T>) -> Result<Self, Self::Error> {
        A.check_format()?;

        let mut cols = Vec::with_capacity(A.nnz());
        for (col, ptr) in A.colptr.windows(2).enumerate() {
            cols.extend(std::iter::repeat(col).take(ptr[1] - ptr[0]));
        }
        Ok(Self {
            m: A.m,
            n: A.n,
            rows: A.rowval.clone(),
            cols,
            vals: A.nzval.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex;

    fn test_matrix_3x3() -> CooMatrix<f64> {
        // A =
        //[ 4.0  -1.0    ⋅ ]
        //[-1.0   4.0  -1.0]
        //[  ⋅   -1.0   4.0]
        CooMatrix::new(
            3,
            3,
            vec![0, 1, 0, 1, 2, 1, 2],
            vec![0, 0, 1, 1, 1, 2, 2],
            vec![4., -1., -1., 4., -1., -1., 4.],
        )
        .unwrap()
    }

    #[test]
    fn test_coo_new_checks() {
        assert_eq!(
            CooMatrix::<f64>::new(2, 2, vec![0, 1], vec![0], vec![1., 2.]),
            Err(SparseFormatError::IncompatibleDimension)
        );
        assert_eq!(
            CooMatrix::<f64>::new(2, 2, vec![0, 2], vec![0, 1], vec![1., 2.]),
            Err(SparseFormatError::BadRowval)
        );
        assert_eq!(
            CooMatrix::<f64>::new(2, 2, vec![0, 1], vec![0, 3], vec![1., 2.]),
            Err(SparseFormatError::BadColval)
        );
    }

    #[test]
    fn test_symmetric() {
        let A = test_matrix_3x3();
        assert!(A.is_symmetric(SYMMETRY_TOL));

        // break symmetry in one off diagonal
        let mut B = A.clone();
        B.vals[1] = -2.;
        assert!(!B.is_symmetric(SYMMETRY_TOL));
    }

    #[test]
    fn test_symmetric_relative_tolerance() {
        // off diagonal mismatch of 1e-3 against a norm of ~1e7
        let A = CooMatrix::new(
            2,
            2,
            vec![0, 1, 0, 1],
            vec![0, 0, 1, 1],
            vec![1e7, 1.0, 1.001, 1e7],
        )
        .unwrap();
        assert!(!A.is_symmetric(1e-6 * 1e-6));
        assert!(A.is_symmetric(1e-9));
    }

    #[test]
    fn test_symmetric_with_duplicates() {
        // the (1,0) entry is split across two triplets
        let A = CooMatrix::new(
            2,
            2,
            vec![0, 1, 1, 0, 1],
            vec![0, 0, 0, 1, 1],
            vec![2., 0.5, 0.5, 1., 2.],
        )
        .unwrap();
        assert!(A.is_symmetric(0.0));
    }

    #[test]
    fn test_nonsquare_not_symmetric() {
        let A = CooMatrix::new(2, 3, vec![0], vec![0], vec![1.]).unwrap();
        assert!(!A.is_symmetric(SYMMETRY_TOL));
    }

    #[test]
    fn test_complex_symmetric() {
        // complex symmetric (not hermitian) matrices are symmetric to MUMPS
        let z = Complex::new(1.0, 2.0);
        let A = CooMatrix::new(
            2,
            2,
            vec![0, 1, 0, 1],
            vec![0, 0, 1, 1],
            vec![Complex::new(3.0, 0.0), z, z, Complex::new(3.0, 0.0)],
        )
        .unwrap();
        assert!(A.is_symmetric(SYMMETRY_TOL));

        let mut B = A.clone();
        B.vals[2] = z.conj();
        assert!(!B.is_symmetric(SYMMETRY_TOL));
    }

    #[test]
    fn test_upper_triangle() {
        let U = test_matrix_3x3().upper_triangle();
        assert_eq!(U.nnz(), 5);
        assert!(U.rows.iter().zip(&U.cols).all(|(r, c)| c >= r));
    }

    #[test]
    fn test_one_based() {
        let (ir, ic) = test_matrix_3x3().to_one_based_i32().unwrap();
        assert_eq!(ir, vec![1, 2, 1, 2, 3, 2, 3]);
        assert_eq!(ic, vec![1, 1, 2, 2, 2, 3, 3]);

        let big = CooMatrix {
            m: usize::MAX,
            n: 1,
            rows: vec![i32::MAX as usize],
            cols: vec![0],
            vals: vec![1.0],
        };
        assert_eq!(
            big.to_one_based_i32(),
            Err(SparseFormatError::IndexOverflow(i32::MAX as usize))
        );

        let huge = CooMatrix {
            m: usize::MAX,
            n: 1,
            rows: vec![usize::MAX],
            cols: vec![0],
            vals: vec![1.0],
        };
        assert_eq!(
            huge.to_one_based_i32(),
            Err(SparseFormatError::IndexOverflow(usize::MAX))
        );
    }

    #[test]
    fn test_from_csc() {
        let A = CscMatrix::new(
            3,
            2,
            vec![0, 2, 3],
            vec![0, 2, 1],
            vec![1., 2., 3.],
        );
        let B = CooMatrix::try_from(&A).unwrap();
        assert_eq!(B.rows, vec![0, 2, 1]);
        assert_eq!(B.cols, vec![0, 0, 1]);
        assert_eq!(B.vals, vec![1., 2., 3.]);
        assert_eq!(B.transpose().size(), (2, 3));
    }

    #[test]
    fn test_from_csc_bad_colptr() {
        // entries before the first column
        let A = CscMatrix::new(2, 2, vec![1, 1, 2], vec![0, 1], vec![1., 2.]);
        assert_eq!(CooMatrix::try_from(&A), Err(SparseFormatError::BadColptr));

        // decreasing column pointers
        let A = CscMatrix::new(2, 2, vec![0, 2, 1], vec![0], vec![1.]);
        assert!(CooMatrix::try_from(&A).is_err());
    }
}
