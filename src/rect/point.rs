//! defines data description

use num_traits::float::Float;

use std::fmt::Debug;

use crate::error::{ClusterError, check_dim, check_index};

/// data to cluster identifier
pub type PointId = usize;

// below this length a vector is not normalized
const NORMALIZE_MIN_LENGTH: f64 = 1.0e-4;
// below this length angle is set to 0
const ANGLE_MIN_LENGTH: f64 = 1.0e-3;

// conversion of constants, infallible for f32 and f64
pub(crate) fn from_f64<T: Float>(x: f64) -> T {
    T::from(x).unwrap_or_else(T::nan)
}

/// A point is a vector of dimension d with an identity and a class label.
/// The dimension is fixed at creation. Equality compares id, label and all coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Point<T> {
    // id to identify points as coming from external client.
    id: PointId,
    /// data point
    p: Vec<T>,
    /// class label
    label: u32,
}

impl<T> Point<T>
where
    T: Float + Debug,
{
    ///a point is characterized by its Id, its coordinates and its class
    pub fn new(id: PointId, p: Vec<T>, label: u32) -> Self {
        Point { id, p, label }
    }

    /// a point at origin
    pub fn zeros(id: PointId, label: u32, dim: usize) -> Self {
        Point {
            id,
            p: vec![T::zero(); dim],
            label,
        }
    }

    /// get the class label
    pub fn get_label(&self) -> u32 {
        self.label
    }

    /// get id
    pub fn get_id(&self) -> PointId {
        self.id
    }

    pub fn set_id(&mut self, id: PointId) {
        self.id = id;
    }

    /// gets the points coordinate
    pub fn get_position(&self) -> &[T] {
        &self.p
    }

    pub fn get_dimension(&self) -> usize {
        self.p.len()
    }

    /// get coordinate i
    pub fn get(&self, i: usize) -> anyhow::Result<T> {
        check_index("coordinate", i, self.p.len())?;
        Ok(self.p[i])
    }

    /// set coordinate i
    pub fn set(&mut self, i: usize, value: T) -> anyhow::Result<()> {
        check_index("coordinate", i, self.p.len())?;
        self.p[i] = value;
        Ok(())
    }

    /// get minima and maxima of coordinates over all dimensions
    pub fn get_minmax(&self) -> (T, T) {
        self.p
            .iter()
            .fold((T::max_value(), T::min_value()), |acc, x| {
                (acc.0.min(*x), acc.1.max(*x))
            })
    }

    /// self += other
    pub fn sum(&mut self, other: &Point<T>) -> anyhow::Result<()> {
        check_dim("sum", self.p.len(), other.p.len())?;
        self.p.iter_mut().zip(&other.p).for_each(|(x, y)| *x = *x + *y);
        Ok(())
    }

    /// self -= other
    pub fn subtract(&mut self, other: &Point<T>) -> anyhow::Result<()> {
        check_dim("subtract", self.p.len(), other.p.len())?;
        self.p.iter_mut().zip(&other.p).for_each(|(x, y)| *x = *x - *y);
        Ok(())
    }

    /// divide all coordinates by factor, fails if factor is 0
    pub fn divide(&mut self, factor: T) -> anyhow::Result<()> {
        if factor == T::zero() {
            return Err(ClusterError::DivisionByZero.into());
        }
        self.p.iter_mut().for_each(|x| *x = *x / factor);
        Ok(())
    }

    /// multiply all coordinates by factor
    pub fn scale(&mut self, factor: T) {
        self.p.iter_mut().for_each(|x| *x = *x * factor);
    }

    /// Euclidean norm
    pub fn length(&self) -> T {
        self.p.iter().fold(T::zero(), |acc, x| acc + *x * *x).sqrt()
    }

    /// scale to unit length. Vectors shorter than 1.e-4 are left unchanged.
    pub fn normalize(&mut self) {
        let len = self.length();
        if len >= from_f64(NORMALIZE_MIN_LENGTH) {
            self.scale(T::one() / len);
        }
    }

    /// truncate coordinates toward 0
    pub fn integrize(&mut self) {
        self.p.iter_mut().for_each(|x| *x = x.trunc());
    }

    pub fn dot(&self, other: &Point<T>) -> anyhow::Result<T> {
        check_dim("dot", self.p.len(), other.p.len())?;
        let dot = self
            .p
            .iter()
            .zip(&other.p)
            .fold(T::zero(), |acc, (x, y)| acc + *x * *y);
        Ok(dot)
    }

    /// angle in [0, pi] between self and other, 0 if one of them has length <= 1.e-3
    pub fn angle(&self, other: &Point<T>) -> anyhow::Result<T> {
        let dot = self.dot(other)?;
        let (l_self, l_other) = (self.length(), other.length());
        let min_length: T = from_f64(ANGLE_MIN_LENGTH);
        if l_self <= min_length || l_other <= min_length {
            return Ok(T::zero());
        }
        let cos_theta = (dot / (l_self * l_other)).max(-T::one()).min(T::one());
        Ok(cos_theta.acos())
    }

    /// Euclidean distance
    pub fn distance(&self, other: &Point<T>) -> anyhow::Result<T> {
        check_dim("distance", self.p.len(), other.p.len())?;
        let dist2 = self.p.iter().zip(&other.p).fold(T::zero(), |acc, (x, y)| {
            let d = *x - *y;
            acc + d * d
        });
        Ok(dist2.sqrt())
    }

    /// moves self away from other : self += (self - other) * factor
    pub fn escape_from(&mut self, other: &Point<T>, factor: T) -> anyhow::Result<()> {
        let mut delta = self.clone();
        delta.subtract(other)?;
        delta.scale(factor);
        self.sum(&delta)
    }
} // end of impl Point

//========================================================

// end of mod tests
