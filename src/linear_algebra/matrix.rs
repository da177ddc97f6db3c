use std::fmt;
use std::ops::{
    Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign,
};

use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ShapeError;

use super::{Value, ValueType};

/// A dense, row-major matrix whose shape is fixed at construction.
///
/// Operations come in two groups. The `*_in_place` methods and the assigning scalar operators
/// mutate `self`; [`multiply`](Self::multiply), [`subtract`](Self::subtract),
/// [`transpose`](Self::transpose) and [`map`](Self::map) leave their operands alone and return
/// a new matrix.
#[derive(Clone, Deserialize, PartialEq, Serialize)]
#[serde(into = "MatrixRecord", try_from = "MatrixRecord")]
pub struct Matrix {
    rows: usize,
    cols: usize,
    values: Vec<Value>,
}

/// The persisted form of a [`Matrix`].
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct MatrixRecord {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<Value>>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            values: vec![Value::ZERO; rows * cols],
        }
    }

    pub fn random(rows: usize, cols: usize, rng: &mut impl Rng) -> Self {
        let mut matrix = Self::zeros(rows, cols);
        matrix.randomize(rng);
        matrix
    }

    /// Builds an `n x 1` column from `values`.
    pub fn from_column(values: &[Value]) -> Self {
        Self {
            rows: values.len(),
            cols: 1,
            values: values.to_vec(),
        }
    }

    /// Every value, row by row.
    pub fn to_vec(&self) -> Vec<Value> {
        self.values.clone()
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut Value> {
        self.values.iter_mut()
    }

    fn check_same_shape(&self, other: &Matrix, operation: &'static str) -> Result<(), ShapeError> {
        if self.shape() == other.shape() {
            Ok(())
        } else {
            Err(ShapeError::new(operation, self.shape(), other.shape()))
        }
    }
}

// Mutating operations ======================

impl Matrix {
    /// Replaces every value with one drawn uniformly from `[-1, 1]`.
    pub fn randomize(&mut self, rng: &mut impl Rng) {
        let distribution = Uniform::new_inclusive(-Value::ONE, Value::ONE);
        self.values_mut()
            .for_each(|x| *x = distribution.sample(rng));
    }

    pub fn add_in_place(&mut self, other: &Matrix) -> Result<(), ShapeError> {
        self.check_same_shape(other, "add")?;
        self.values
            .iter_mut()
            .zip(&other.values)
            .for_each(|(x, y)| *x += y);
        Ok(())
    }

    /// Hadamard product. Scaling by a single value is `*=`.
    pub fn multiply_in_place(&mut self, other: &Matrix) -> Result<(), ShapeError> {
        self.check_same_shape(other, "elementwise multiply")?;
        self.values
            .iter_mut()
            .zip(&other.values)
            .for_each(|(x, y)| *x *= y);
        Ok(())
    }

    pub fn map_in_place(&mut self, f: impl Fn(Value) -> Value) {
        self.values_mut().for_each(|x| *x = f(*x));
    }
}

// Allocating operations ====================

impl Matrix {
    /// The matrix product `self x rhs`.
    pub fn multiply(&self, rhs: &Matrix) -> Result<Matrix, ShapeError> {
        if self.cols != rhs.rows {
            return Err(ShapeError::new("multiply", self.shape(), rhs.shape()));
        }

        let mut result = Matrix::zeros(self.rows, rhs.cols);
        for row in 0..self.rows {
            for column in 0..rhs.cols {
                result[row][column] = self[row]
                    .iter()
                    .enumerate()
                    .map(|(k, a)| a * rhs[k][column])
                    .sum();
            }
        }
        Ok(result)
    }

    /// The elementwise difference `self - rhs`.
    pub fn subtract(&self, rhs: &Matrix) -> Result<Matrix, ShapeError> {
        self.check_same_shape(rhs, "subtract")?;
        let mut result = self.clone();
        result
            .values
            .iter_mut()
            .zip(&rhs.values)
            .for_each(|(x, y)| *x -= y);
        Ok(result)
    }

    pub fn transpose(&self) -> Matrix {
        let mut result = Matrix::zeros(self.cols, self.rows);
        for row in 0..self.rows {
            for column in 0..self.cols {
                result[column][row] = self[row][column];
            }
        }
        result
    }

    pub fn map(&self, f: impl Fn(Value) -> Value) -> Matrix {
        let mut result = self.clone();
        result.map_in_place(f);
        result
    }
}

macro_rules! value_op_impl {
    ($op:ident, $op_method:ident, $op_assign:ident, $op_assign_method:ident) => {
        impl $op<Value> for Matrix {
            type Output = Matrix;

            fn $op_method(mut self, rhs: Value) -> Self::Output {
                self.$op_assign_method(rhs);
                self
            }
        }

        impl $op<Value> for &Matrix {
            type Output = Matrix;

            fn $op_method(self, rhs: Value) -> Self::Output {
                self.clone().$op_method(rhs)
            }
        }

        impl $op_assign<Value> for Matrix {
            fn $op_assign_method(&mut self, rhs: Value) {
                for x in self.values.iter_mut() {
                    (*x).$op_assign_method(rhs)
                }
            }
        }
    };
}

value_op_impl!(Add, add, AddAssign, add_assign);
value_op_impl!(Sub, sub, SubAssign, sub_assign);
value_op_impl!(Mul, mul, MulAssign, mul_assign);
value_op_impl!(Div, div, DivAssign, div_assign);

impl Neg for Matrix {
    type Output = Matrix;

    fn neg(self) -> Self::Output {
        self * -Value::ONE
    }
}

impl Neg for &Matrix {
    type Output = Matrix;

    fn neg(self) -> Self::Output {
        self * -Value::ONE
    }
}

impl Index<usize> for Matrix {
    type Output = [Value];

    fn index(&self, row: usize) -> &Self::Output {
        &self.values[row * self.cols..(row + 1) * self.cols]
    }
}

impl IndexMut<usize> for Matrix {
    fn index_mut(&mut self, row: usize) -> &mut Self::Output {
        &mut self.values[row * self.cols..(row + 1) * self.cols]
    }
}

impl<const R: usize, const C: usize> From<[[Value; C]; R]> for Matrix {
    fn from(values: [[Value; C]; R]) -> Self {
        Self {
            rows: R,
            cols: C,
            values: values.into_iter().flatten().collect(),
        }
    }
}

impl From<Matrix> for MatrixRecord {
    fn from(matrix: Matrix) -> Self {
        let data = if matrix.cols == 0 {
            vec![Vec::new(); matrix.rows]
        } else {
            matrix
                .values
                .chunks(matrix.cols)
                .map(<[Value]>::to_vec)
                .collect()
        };

        Self {
            rows: matrix.rows,
            cols: matrix.cols,
            data,
        }
    }
}

impl TryFrom<MatrixRecord> for Matrix {
    type Error = ShapeError;

    fn try_from(record: MatrixRecord) -> Result<Self, Self::Error> {
        let expected = (record.rows, record.cols);

        if record.data.len() != record.rows {
            let found_cols = record.data.first().map_or(0, Vec::len);
            return Err(ShapeError::new(
                "deserialize",
                expected,
                (record.data.len(), found_cols),
            ));
        }

        if let Some(row) = record.data.iter().find(|row| row.len() != record.cols) {
            return Err(ShapeError::new(
                "deserialize",
                expected,
                (record.rows, row.len()),
            ));
        }

        Ok(Self {
            rows: record.rows,
            cols: record.cols,
            values: record.data.into_iter().flatten().collect(),
        })
    }
}

impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows == 0 || self.cols == 0 {
            return write!(f, "[]");
        }

        for row in 0..self.rows {
            write!(f, "{}", if row == 0 { "[" } else { " " })?;
            for column in 0..self.cols {
                fmt::Debug::fmt(&self[row][column], f)?;
                if column < self.cols - 1 {
                    write!(f, " ")?;
                }
            }
            write!(f, "{}", if row < self.rows - 1 { "\n" } else { "]" })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn column_conversion() {
        let m = Matrix::from_column(&[1.0, 2.0, 3.0]);
        assert_eq!(m.shape(), (3, 1));
        assert_eq!(m[1][0], 2.0);
        assert_eq!(m.to_vec(), vec![1.0, 2.0, 3.0]);

        let m: Matrix = [[1.0, 2.0], [3.0, 4.0]].into();
        assert_eq!(m.to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn randomize() {
        let mut rng = StdRng::seed_from_u64(7);
        let m = Matrix::random(8, 8, &mut rng);
        assert!(m.values().all(|x| (-1.0..=1.0).contains(x)));
        assert!(m.values().any(|&x| x != 0.0));

        let n = Matrix::random(8, 8, &mut StdRng::seed_from_u64(7));
        assert_eq!(m, n);
    }

    #[test]
    fn multiply() {
        let m: Matrix = [[1.0, 2.0, 3.0, 4.0], [5.0, 6.0, 7.0, 8.0]].into();
        let n: Matrix = [
            [1.0, 5.0, 9.0],
            [2.0, 6.0, 10.0],
            [3.0, 7.0, 11.0],
            [4.0, 8.0, 12.0],
        ]
        .into();
        let o: Matrix = [[30.0, 70.0, 110.0], [70.0, 174.0, 278.0]].into();
        assert_eq!(m.multiply(&n), Ok(o));
    }

    #[test]
    fn multiply_shape_mismatch() {
        let m = Matrix::zeros(2, 3);
        let n = Matrix::zeros(2, 3);
        assert_eq!(
            Matrix::multiply(&m, &n),
            Err(ShapeError::new("multiply", (2, 3), (2, 3)))
        );
    }

    #[test]
    fn transpose() {
        let m: Matrix = [[1.0, 2.0, 3.0, 4.0], [5.0, 6.0, 7.0, 8.0]].into();
        let n: Matrix = [[1.0, 5.0], [2.0, 6.0], [3.0, 7.0], [4.0, 8.0]].into();
        assert_eq!(m.transpose(), n);
        assert_eq!(m.transpose().transpose(), m);

        let mut rng = StdRng::seed_from_u64(3);
        let r = Matrix::random(5, 2, &mut rng);
        assert_eq!(Matrix::transpose(&Matrix::transpose(&r)), r);
    }

    #[test]
    fn add_commutes() {
        let mut rng = StdRng::seed_from_u64(11);
        let a = Matrix::random(3, 4, &mut rng);
        let b = Matrix::random(3, 4, &mut rng);

        let mut ab = a.clone();
        ab.add_in_place(&b).unwrap();
        let mut ba = b.clone();
        ba.add_in_place(&a).unwrap();

        assert_eq!(ab, ba);
    }

    #[test]
    fn elementwise_shape_mismatch() {
        let mut m = Matrix::zeros(2, 2);
        let n = Matrix::zeros(2, 1);
        assert!(m.add_in_place(&n).is_err());
        assert!(m.multiply_in_place(&n).is_err());
        assert!(m.subtract(&n).is_err());
        assert_eq!(m, Matrix::zeros(2, 2));
    }

    #[test]
    fn subtract() {
        let m: Matrix = [[5.0, 3.0], [1.0, -2.0]].into();
        let n: Matrix = [[1.0, 1.0], [2.0, 2.0]].into();
        let o: Matrix = [[4.0, 2.0], [-1.0, -4.0]].into();
        assert_eq!(Matrix::subtract(&m, &n), Ok(o));
        assert_eq!(m[0][0], 5.0);
    }

    #[test]
    fn hadamard_and_scalar() {
        let mut m: Matrix = [[1.0, 2.0], [3.0, 4.0]].into();
        let n: Matrix = [[2.0, 0.5], [-1.0, 0.0]].into();
        m.multiply_in_place(&n).unwrap();
        assert_eq!(m, Matrix::from([[2.0, 1.0], [-3.0, 0.0]]));

        m *= 2.0;
        assert_eq!(m, Matrix::from([[4.0, 2.0], [-6.0, 0.0]]));
        assert_eq!(-&m + 1.0, Matrix::from([[-3.0, -1.0], [7.0, 1.0]]));
    }

    #[test]
    fn map() {
        let mut m: Matrix = [[1.0, -2.0], [3.0, -4.0]].into();
        let n = m.map(|x| x * x);
        assert_eq!(n, Matrix::from([[1.0, 4.0], [9.0, 16.0]]));
        assert_eq!(m[0][1], -2.0);

        m.map_in_place(f32::abs);
        assert_eq!(m, Matrix::from([[1.0, 2.0], [3.0, 4.0]]));
    }

    #[test]
    fn copies_are_independent() {
        let m: Matrix = [[1.0, 2.0]].into();
        let mut n = m.clone();
        n[0][0] = 9.0;
        assert_eq!(m[0][0], 1.0);
    }

    #[test]
    fn serde() {
        let m: Matrix = [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]].into();
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, r#"{"rows":2,"cols":3,"data":[[1.0,2.0,3.0],[4.0,5.0,6.0]]}"#);

        let n: Matrix = serde_json::from_str(&json).unwrap();
        assert_eq!(n, m);
        assert_eq!(n.transpose(), m.transpose());
    }

    #[test]
    fn deserialize_mismatched_data() {
        let record = MatrixRecord {
            rows: 2,
            cols: 2,
            data: vec![vec![1.0, 2.0], vec![3.0]],
        };
        assert_eq!(
            Matrix::try_from(record),
            Err(ShapeError::new("deserialize", (2, 2), (2, 1)))
        );

        let json = r#"{"rows":3,"cols":1,"data":[[1.0],[2.0]]}"#;
        assert!(serde_json::from_str::<Matrix>(json).is_err());
    }
}
