//! An instance gathers labeled points and the number of clusters required for each class.

use num_traits::float::Float;
use rand::Rng;

use std::fmt::Debug;

use super::point::Point;
use crate::error::{ClusterError, check_dim, check_index};
use crate::merit::affect::VecAffectation;

/// Points of an instance all have the same dimension. Points are referred to by their rank
/// in the instance, clusters store ranks and never own points.
#[derive(Debug, Clone)]
pub struct Instance<T> {
    name: String,
    nb_classes: usize,
    points: Vec<Point<T>>,
    // clusters[c] is the number of clusters required for class c
    clusters: Vec<usize>,
}

impl<T> Instance<T>
where
    T: Float + Debug,
{
    /// an instance requiring one cluster by class
    pub fn new(name: &str, nb_classes: usize) -> Self {
        Instance::with_clusters(name, nb_classes, 1)
    }

    /// an instance requiring clusters_by_class clusters in each class
    pub fn with_clusters(name: &str, nb_classes: usize, clusters_by_class: usize) -> Self {
        Instance {
            name: name.to_string(),
            nb_classes,
            points: Vec::new(),
            clusters: vec![clusters_by_class; nb_classes],
        }
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn get_nb_classes(&self) -> usize {
        self.nb_classes
    }

    /// set number of clusters for a class
    pub fn set_clusters(&mut self, class: u32, nb_clusters: usize) -> anyhow::Result<()> {
        check_index("class", class as usize, self.nb_classes)?;
        self.clusters[class as usize] = nb_clusters;
        Ok(())
    }

    /// number of clusters required for a class
    pub fn get_clusters(&self, class: u32) -> anyhow::Result<usize> {
        check_index("class", class as usize, self.nb_classes)?;
        Ok(self.clusters[class as usize])
    }

    /// total number of clusters over all classes
    pub fn get_total_clusters(&self) -> usize {
        self.clusters.iter().sum()
    }

    /// adds a point. Its dimension must match points already present and its label must be a valid class.
    pub fn add(&mut self, point: Point<T>) -> anyhow::Result<()> {
        if let Some(first) = self.points.first() {
            check_dim(
                "instance add",
                first.get_dimension(),
                point.get_dimension(),
            )?;
        }
        check_index("class", point.get_label() as usize, self.nb_classes)?;
        self.points.push(point);
        Ok(())
    }

    /// number of points
    pub fn get_nb_points(&self) -> usize {
        self.points.len()
    }

    /// point of rank i
    pub fn get_point(&self, i: usize) -> anyhow::Result<&Point<T>> {
        check_index("point", i, self.points.len())?;
        Ok(&self.points[i])
    }

    pub fn get_points(&self) -> &[Point<T>] {
        &self.points
    }

    /// 0 for an empty instance
    pub fn get_dimension(&self) -> usize {
        self.points.first().map_or(0, |p| p.get_dimension())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point<T>> {
        self.points.iter()
    }

    /// iterates on (rank, point) for points of a class
    pub fn iter_class(&self, class: u32) -> impl Iterator<Item = (usize, &Point<T>)> {
        self.points
            .iter()
            .enumerate()
            .filter(move |(_, p)| p.get_label() == class)
    }

    /// smallest value of coordinate over all points, 0 if instance is empty
    pub fn min(&self, coordinate: usize) -> anyhow::Result<T> {
        if self.points.is_empty() {
            return Ok(T::zero());
        }
        check_index("coordinate", coordinate, self.get_dimension())?;
        let min = self
            .points
            .iter()
            .fold(T::infinity(), |acc, p| acc.min(p.get_position()[coordinate]));
        Ok(min)
    }

    /// largest value of coordinate over all points, 0 if instance is empty
    pub fn max(&self, coordinate: usize) -> anyhow::Result<T> {
        if self.points.is_empty() {
            return Ok(T::zero());
        }
        check_index("coordinate", coordinate, self.get_dimension())?;
        let max = self
            .points
            .iter()
            .fold(T::neg_infinity(), |acc, p| acc.max(p.get_position()[coordinate]));
        Ok(max)
    }

    /// diagonal of the box enclosing all points
    pub fn global_diameter(&self) -> anyhow::Result<T> {
        let dim = self.get_dimension();
        let mut lower = Point::<T>::zeros(0, 0, dim);
        let mut upper = Point::<T>::zeros(1, 0, dim);
        for d in 0..dim {
            lower.set(d, self.min(d)?)?;
            upper.set(d, self.max(d)?)?;
        }
        lower.distance(&upper)
    }

    /// scale all points
    pub fn scale(&mut self, factor: T) {
        self.points.iter_mut().for_each(|p| p.scale(factor));
    }

    /// sample uniformly a point of a given class. Returns None if the class has no point.
    pub fn random<R: Rng + ?Sized>(&self, rng: &mut R, class: u32) -> Option<&Point<T>> {
        let ranks: Vec<usize> = self.iter_class(class).map(|(rank, _)| rank).collect();
        if ranks.is_empty() {
            return None;
        }
        Some(&self.points[ranks[rng.random_range(0..ranks.len())]])
    }

    /// checks each class having points asks for at least one cluster
    pub fn check_clusters(&self) -> anyhow::Result<()> {
        let mut nb_by_class = vec![0usize; self.nb_classes];
        for p in &self.points {
            nb_by_class[p.get_label() as usize] += 1;
        }
        for (class, nb) in nb_by_class.iter().enumerate() {
            if *nb > 0 && self.clusters[class] == 0 {
                log::error!("class {} has {} points but 0 clusters", class, nb);
                return Err(ClusterError::Configuration(format!(
                    "class {} has {} points but no cluster",
                    class, nb
                ))
                .into());
            }
        }
        Ok(())
    }

    /// the true classes seen as a clusterization
    pub fn class_affectation(&self) -> VecAffectation<u32> {
        let labels = self.points.iter().map(|p| p.get_label()).collect();
        VecAffectation::new(labels, self.nb_classes)
    }
} // end of impl Instance

//========================================================

// end of mod tests
