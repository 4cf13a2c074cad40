//! A solution is an ordered list of clusters, one full partition of the instance points.

use num_traits::float::Float;

use std::fmt::Debug;

use super::cluster::Cluster;
use super::instance::Instance;
use super::point::from_f64;
use crate::error::{ClusterError, check_index};
use crate::merit::affect::VecAffectation;

/// The rank of a cluster in a solution built by the heuristic is the rank of the centroid it was built from.
#[derive(Debug, Clone)]
pub struct Solution<'a, T> {
    clusters: Vec<Cluster<'a, T>>,
}

impl<'a, T> Solution<'a, T>
where
    T: Float + Debug,
{
    pub fn new() -> Self {
        Solution {
            clusters: Vec::new(),
        }
    }

    pub fn from_clusters(clusters: Vec<Cluster<'a, T>>) -> Self {
        Solution { clusters }
    }

    /// nb_clusters empty clusters
    pub fn with_empty_clusters(instance: &'a Instance<T>, nb_clusters: usize) -> Self {
        let clusters = (0..nb_clusters).map(|_| Cluster::new(instance)).collect();
        Solution { clusters }
    }

    /// one singleton by point
    pub fn with_all_singletons(instance: &'a Instance<T>) -> anyhow::Result<Self> {
        let clusters = (0..instance.get_nb_points())
            .map(|rank| Cluster::singleton(instance, rank))
            .collect::<anyhow::Result<Vec<Cluster<'a, T>>>>()?;
        Ok(Solution { clusters })
    }

    /// a solution with one cluster gathering all points of a class
    pub fn with_all_points(instance: &'a Instance<T>, class: u32) -> anyhow::Result<Self> {
        let mut solution = Solution::new();
        solution.add(Cluster::with_all_points(instance, class)?);
        Ok(solution)
    }

    pub fn add(&mut self, cluster: Cluster<'a, T>) {
        self.clusters.push(cluster);
    }

    /// removes and returns cluster at index
    pub fn remove(&mut self, index: usize) -> anyhow::Result<Cluster<'a, T>> {
        check_index("cluster", index, self.clusters.len())?;
        Ok(self.clusters.remove(index))
    }

    /// adds point of rank `rank` to cluster j
    pub fn add_to(&mut self, rank: usize, j: usize) -> anyhow::Result<()> {
        check_index("cluster", j, self.clusters.len())?;
        self.clusters[j].add(rank)
    }

    pub fn size(&self) -> usize {
        self.clusters.len()
    }

    pub fn get_clusters(&self) -> &[Cluster<'a, T>] {
        &self.clusters
    }

    pub fn get_cluster(&self, j: usize) -> anyhow::Result<&Cluster<'a, T>> {
        check_index("cluster", j, self.clusters.len())?;
        Ok(&self.clusters[j])
    }

    pub fn get_cluster_mut(&mut self, j: usize) -> anyhow::Result<&mut Cluster<'a, T>> {
        check_index("cluster", j, self.clusters.len())?;
        Ok(&mut self.clusters[j])
    }

    pub fn total_span(&self) -> T {
        self.clusters.iter().fold(T::zero(), |acc, c| acc + c.span())
    }

    pub fn total_diagonal(&self) -> T {
        self.clusters
            .iter()
            .fold(T::zero(), |acc, c| acc + c.diagonal())
    }

    /// 0 for a solution without cluster
    pub fn average_diagonal(&self) -> T {
        if self.clusters.is_empty() {
            return T::zero();
        }
        self.total_diagonal() / from_f64(self.clusters.len() as f64)
    }

    /// objective shared with the exact model : sum of diagonals
    pub fn objective(&self) -> T {
        self.total_diagonal()
    }

    /// number of (cluster, foreign point) couples with the foreign point inside the cluster box
    pub fn nb_misclassified(&self) -> anyhow::Result<usize> {
        let mut nb = 0;
        for c in &self.clusters {
            nb += c.misclassified()?.len();
        }
        Ok(nb)
    }

    /// gives for each point rank the index of its cluster.
    /// Fails if some point is in no cluster or in more than one.
    pub fn affectation(&self) -> anyhow::Result<VecAffectation<usize>> {
        let Some(instance) = self.clusters.first().map(|c| c.get_instance()) else {
            return Ok(VecAffectation::new(Vec::new(), 0));
        };
        let mut affected: Vec<Option<usize>> = vec![None; instance.get_nb_points()];
        for (j, c) in self.clusters.iter().enumerate() {
            if !std::ptr::eq(instance, c.get_instance()) {
                return Err(ClusterError::NotAPartition(
                    "clusters from different instances".to_string(),
                )
                .into());
            }
            for rank in c.get_members() {
                if let Some(other) = affected[*rank].replace(j) {
                    return Err(ClusterError::NotAPartition(format!(
                        "point of rank {} in clusters {} and {}",
                        rank, other, j
                    ))
                    .into());
                }
            }
        }
        let labels = affected
            .iter()
            .enumerate()
            .map(|(rank, j)| {
                j.ok_or_else(|| {
                    ClusterError::NotAPartition(format!("point of rank {} in no cluster", rank))
                })
            })
            .collect::<Result<Vec<usize>, ClusterError>>()?;
        Ok(VecAffectation::new(labels, self.clusters.len()))
    }
} // end of impl Solution

impl<T> Default for Solution<'_, T>
where
    T: Float + Debug,
{
    fn default() -> Self {
        Solution::new()
    }
}

//========================================================

// end of mod tests
