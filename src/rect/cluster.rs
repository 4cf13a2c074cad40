//! A cluster is a set of points of the same class together with its bounding box (a rectangle).

use indexmap::IndexSet;
use num_traits::float::Float;

use std::fmt::Debug;

use super::instance::Instance;
use super::point::{Point, from_f64};
use crate::error::{ClusterError, check_dim, check_index};

/// axis aligned box given by its minimal and maximal coordinates in each dimension
#[derive(Debug, Clone, PartialEq)]
pub struct Rectangle<T> {
    min: Vec<T>,
    max: Vec<T>,
}

impl<T> Rectangle<T>
where
    T: Float + Debug,
{
    /// degenerate box reduced to a point
    pub fn from_point(point: &Point<T>) -> Self {
        Rectangle {
            min: point.get_position().to_vec(),
            max: point.get_position().to_vec(),
        }
    }

    pub fn get_dimension(&self) -> usize {
        self.min.len()
    }

    pub fn get_min(&self) -> &[T] {
        &self.min
    }

    pub fn get_max(&self) -> &[T] {
        &self.max
    }

    // enlarge box so that it encloses point
    fn widen(&mut self, xyz: &[T]) {
        for d in 0..xyz.len() {
            self.min[d] = self.min[d].min(xyz[d]);
            self.max[d] = self.max[d].max(xyz[d]);
        }
    }

    // true if point lies on one face of the box
    fn on_border(&self, xyz: &[T]) -> bool {
        xyz.iter()
            .enumerate()
            .any(|(d, x)| *x == self.min[d] || *x == self.max[d])
    }

    /// true if every coordinate of xyz is in [min, max]
    pub fn covers(&self, xyz: &[T]) -> bool {
        xyz.iter()
            .enumerate()
            .all(|(d, x)| self.min[d] <= *x && *x <= self.max[d])
    }

    /// minimum over dimensions of distance to min or max face in that dimension.
    pub fn distance_to_border(&self, xyz: &[T]) -> T {
        xyz.iter().enumerate().fold(T::infinity(), |acc, (d, x)| {
            acc.min((*x - self.min[d]).abs())
                .min((*x - self.max[d]).abs())
        })
    }

    /// sum over dimensions of max - min
    pub fn span(&self) -> T {
        self.min
            .iter()
            .zip(&self.max)
            .fold(T::zero(), |acc, (m, mx)| acc + (*mx - *m))
    }

    /// distance between lower and upper corner
    pub fn diagonal(&self) -> T {
        self.min
            .iter()
            .zip(&self.max)
            .fold(T::zero(), |acc, (m, mx)| acc + (*mx - *m) * (*mx - *m))
            .sqrt()
    }
} // end of impl Rectangle

//====

/// A cluster references points of an instance by their rank. Its class is the class of the first point
/// added, all points must share this class. The rectangle is always the exact envelope of the members
/// and is None when cluster is empty.
#[derive(Debug, Clone)]
pub struct Cluster<'a, T> {
    instance: &'a Instance<T>,
    // ranks of points in instance
    members: IndexSet<usize>,
    //
    rectangle: Option<Rectangle<T>>,
    //
    class: Option<u32>,
}

impl<'a, T> Cluster<'a, T>
where
    T: Float + Debug,
{
    /// an empty cluster
    pub fn new(instance: &'a Instance<T>) -> Self {
        Cluster {
            instance,
            members: IndexSet::new(),
            rectangle: None,
            class: None,
        }
    }

    /// cluster made of points of given ranks
    pub fn from_ranks(instance: &'a Instance<T>, ranks: &[usize]) -> anyhow::Result<Self> {
        let mut cluster = Cluster::new(instance);
        for rank in ranks {
            cluster.add(*rank)?;
        }
        Ok(cluster)
    }

    /// cluster with one point
    pub fn singleton(instance: &'a Instance<T>, rank: usize) -> anyhow::Result<Self> {
        Cluster::from_ranks(instance, &[rank])
    }

    /// cluster with all points of a class
    pub fn with_all_points(instance: &'a Instance<T>, class: u32) -> anyhow::Result<Self> {
        let ranks: Vec<usize> = instance.iter_class(class).map(|(rank, _)| rank).collect();
        Cluster::from_ranks(instance, &ranks)
    }

    pub fn get_instance(&self) -> &'a Instance<T> {
        self.instance
    }

    /// adds point of rank `rank` in instance.
    pub fn add(&mut self, rank: usize) -> anyhow::Result<()> {
        let point = self.instance.get_point(rank)?;
        match (self.class, self.rectangle.as_mut()) {
            (Some(class), Some(rectangle)) => {
                if class != point.get_label() {
                    return Err(ClusterError::ClassViolation {
                        point_class: point.get_label(),
                        cluster_class: class,
                    }
                    .into());
                }
                rectangle.widen(point.get_position());
            }
            _ => {
                self.rectangle = Some(Rectangle::from_point(point));
                self.class = Some(point.get_label());
            }
        }
        self.members.insert(rank);
        Ok(())
    }

    /// removes point of rank `rank`, returns false if it was not a member
    pub fn remove(&mut self, rank: usize) -> bool {
        if !self.members.shift_remove(&rank) {
            return false;
        }
        if self.members.is_empty() {
            self.rectangle = None;
            self.class = None;
            return true;
        }
        // the box can only shrink if removed point was on a face
        let xyz = self.instance.get_points()[rank].get_position();
        if self.rectangle.as_ref().is_some_and(|r| r.on_border(xyz)) {
            self.rectangle = self.envelope();
        }
        true
    }

    // recompute rectangle from members
    fn envelope(&self) -> Option<Rectangle<T>> {
        let mut points = self.points();
        let mut rectangle = Rectangle::from_point(points.next()?);
        for p in points {
            rectangle.widen(p.get_position());
        }
        Some(rectangle)
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, rank: usize) -> bool {
        self.members.contains(&rank)
    }

    /// ranks of member points, in insertion order
    pub fn get_members(&self) -> &IndexSet<usize> {
        &self.members
    }

    /// iterates over member points
    pub fn points(&self) -> impl Iterator<Item = &'a Point<T>> {
        let points = self.instance.get_points();
        self.members.iter().map(move |rank| &points[*rank])
    }

    /// class of cluster, None if empty
    pub fn get_class(&self) -> Option<u32> {
        self.class
    }

    /// bounding box, None if empty
    pub fn get_rectangle(&self) -> Option<&Rectangle<T>> {
        self.rectangle.as_ref()
    }

    // a point with id and label of first member and given coordinates
    fn labeled_point(&self, xyz: &[T]) -> Option<Point<T>> {
        let first = self.points().next()?;
        Some(Point::new(first.get_id(), xyz.to_vec(), first.get_label()))
    }

    /// elementwise minimum of members
    pub fn lower_corner(&self) -> Option<Point<T>> {
        self.labeled_point(self.rectangle.as_ref()?.get_min())
    }

    /// elementwise maximum of members
    pub fn upper_corner(&self) -> Option<Point<T>> {
        self.labeled_point(self.rectangle.as_ref()?.get_max())
    }

    /// mean of member points. It carries id and label of the first point. None if empty.
    pub fn centroid(&self) -> anyhow::Result<Option<Point<T>>> {
        let mut points = self.points();
        let Some(first) = points.next() else {
            return Ok(None);
        };
        let mut centroid = first.clone();
        for p in points {
            centroid.sum(p)?;
        }
        centroid.divide(from_f64(self.size() as f64))?;
        Ok(Some(centroid))
    }

    /// sum of distances of members to centroid
    pub fn total_distance_to_centroid(&self) -> anyhow::Result<T> {
        let Some(centroid) = self.centroid()? else {
            return Ok(T::zero());
        };
        let mut total = T::zero();
        for p in self.points() {
            total = total + p.distance(&centroid)?;
        }
        Ok(total)
    }

    /// sum over dimensions of the box extension, 0 if empty
    pub fn span(&self) -> T {
        self.rectangle.as_ref().map_or(T::zero(), |r| r.span())
    }

    /// box extension in dimension dim, 0 if empty
    pub fn span_dim(&self, dim: usize) -> anyhow::Result<T> {
        match self.rectangle.as_ref() {
            Some(r) => {
                check_index("coordinate", dim, r.get_dimension())?;
                Ok(r.get_max()[dim] - r.get_min()[dim])
            }
            None => Ok(T::zero()),
        }
    }

    /// distance between lower and upper corner, 0 if empty
    pub fn diagonal(&self) -> T {
        self.rectangle.as_ref().map_or(T::zero(), |r| r.diagonal())
    }

    /// normalized vector from lower to upper corner, None if empty
    pub fn diagonal_direction(&self) -> anyhow::Result<Option<Point<T>>> {
        let (Some(lower), Some(mut upper)) = (self.lower_corner(), self.upper_corner()) else {
            return Ok(None);
        };
        upper.subtract(&lower)?;
        upper.normalize();
        Ok(Some(upper))
    }

    /// Chebyshev style distance to the nearest face of the box: min over dimensions of distance to min or max.
    pub fn distance_to_border(&self, point: &Point<T>) -> anyhow::Result<T> {
        let Some(rectangle) = self.rectangle.as_ref() else {
            return Err(ClusterError::EmptyCluster {
                operation: "distance_to_border",
            }
            .into());
        };
        check_dim(
            "distance_to_border",
            rectangle.get_dimension(),
            point.get_dimension(),
        )?;
        Ok(rectangle.distance_to_border(point.get_position()))
    }

    /// true if point is inside the box (border included). An empty cluster covers nothing.
    pub fn covers(&self, point: &Point<T>) -> anyhow::Result<bool> {
        let Some(rectangle) = self.rectangle.as_ref() else {
            return Ok(false);
        };
        check_dim("covers", rectangle.get_dimension(), point.get_dimension())?;
        Ok(rectangle.covers(point.get_position()))
    }

    /// points of the instance of another class that are inside the box, in instance order
    pub fn misclassified(&self) -> anyhow::Result<Vec<&'a Point<T>>> {
        let (Some(class), Some(rectangle)) = (self.class, self.rectangle.as_ref()) else {
            return Ok(Vec::new());
        };
        check_dim(
            "misclassified",
            rectangle.get_dimension(),
            self.instance.get_dimension(),
        )?;
        let foreign = self
            .instance
            .get_points()
            .iter()
            .filter(|p| p.get_label() != class && rectangle.covers(p.get_position()))
            .collect();
        Ok(foreign)
    }

    /// a new cluster with members of both clusters
    pub fn union(&self, other: &Cluster<'a, T>) -> anyhow::Result<Cluster<'a, T>> {
        if !std::ptr::eq(self.instance, other.instance) {
            return Err(ClusterError::Configuration(
                "union of clusters from different instances".to_string(),
            )
            .into());
        }
        let mut union = self.clone();
        for rank in other.members.iter() {
            union.add(*rank)?;
        }
        Ok(union)
    }
} // end of impl Cluster

/// clusters are equal if they have the same members
impl<T> PartialEq for Cluster<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.instance, other.instance) && self.members == other.members
    }
}

//========================================================

// end of mod tests
