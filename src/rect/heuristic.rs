//! Heuristic partitioning of labeled points in clusters with few foreign points in their bounding boxes.
//!
//! The heuristic is a class constrained k-means where each centroid is pushed away from the
//! foreign points its cluster box covers.
//! - initialization : for each class, as many points of the class as required clusters are sampled as centroids.
//! - assignment : each point goes to the nearest centroid **of its own class**.
//! - update : each centroid is recomputed as the mean of its cluster then repelled by misclassified points.
//!
//! Iterations stop when no centroid moves more than a tolerance, or when the iteration limit is reached.

use num_traits::float::Float;
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;

use cpu_time::ProcessTime;
use std::fmt::Debug;
use std::time::{Duration, SystemTime};

use super::cluster::Cluster;
use super::instance::Instance;
use super::point::{Point, from_f64};
use super::solution::Solution;
use crate::error::ClusterError;

/// parameters driving the heuristic
#[derive(Debug, Clone, Copy)]
pub struct HeuristicParams {
    // seed of the random generator used to sample initial centroids
    seed: u64,
    // safety cap on assignment/update rounds
    max_iterations: usize,
    // a centroid moving more than this is considered as moved
    move_tolerance: f64,
    // multiplies the gaussian repulsion weight
    repulsion_scale: f64,
    // repulsion factor used when centroid is on its box border
    zero_radius_factor: f64,
}

impl HeuristicParams {
    pub fn new(seed: u64, max_iterations: usize) -> Self {
        HeuristicParams {
            seed,
            max_iterations,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_move_tolerance(mut self, move_tolerance: f64) -> Self {
        self.move_tolerance = move_tolerance;
        self
    }

    pub fn with_repulsion_scale(mut self, repulsion_scale: f64) -> Self {
        self.repulsion_scale = repulsion_scale;
        self
    }

    pub fn with_zero_radius_factor(mut self, zero_radius_factor: f64) -> Self {
        self.zero_radius_factor = zero_radius_factor;
        self
    }

    pub fn get_seed(&self) -> u64 {
        self.seed
    }

    pub fn get_max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn get_move_tolerance(&self) -> f64 {
        self.move_tolerance
    }

    pub fn get_repulsion_scale(&self) -> f64 {
        self.repulsion_scale
    }

    pub fn get_zero_radius_factor(&self) -> f64 {
        self.zero_radius_factor
    }
} // end of impl HeuristicParams

impl Default for HeuristicParams {
    fn default() -> Self {
        HeuristicParams {
            seed: 0,
            max_iterations: 1000,
            move_tolerance: 1.0e-3,
            repulsion_scale: 0.1,
            zero_radius_factor: 0.1,
        }
    }
}

//====

/// how the iterations ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convergence {
    /// no centroid moved during last update
    Converged,
    /// iteration limit reached while some centroid still moved
    IterationLimit,
}

/// result of a run
#[derive(Debug, Clone)]
pub struct HeuristicResult<'a, T> {
    /// last solution built. Cluster j was built from centroid j
    pub solution: Solution<'a, T>,
    /// centroids at end of run, None for a slot that never got a point
    pub centroids: Vec<Option<Point<T>>>,
    pub status: Convergence,
    /// number of assignment rounds
    pub iterations: usize,
}

impl<T> HeuristicResult<'_, T> {
    pub fn has_converged(&self) -> bool {
        self.status == Convergence::Converged
    }
}

//====

#[cfg_attr(doc, katexit::katexit)]
/// The heuristic engine. It borrows the instance, solutions it builds reference its points.
///
/// At update, with $r$ the distance of the cluster mean to the box border and $d$ the distance of a foreign
/// point to the border, the centroid escapes from the foreign point $f$ :
/// $$ c \leftarrow c + s \exp(-d^2/r^2) (c - f)$$ where $s$ is the repulsion scale.
/// If $r = 0$ the factor $s \exp(-d^2/r^2)$ is replaced by the zero radius factor.
pub struct Heuristic<'a, T> {
    instance: &'a Instance<T>,
    params: HeuristicParams,
}

impl<'a, T> Heuristic<'a, T>
where
    T: Float + Debug + Send + Sync,
{
    pub fn new(instance: &'a Instance<T>, params: HeuristicParams) -> Self {
        Heuristic { instance, params }
    }

    pub fn get_params(&self) -> &HeuristicParams {
        &self.params
    }

    /// runs with a Xoshiro256PlusPlus generator seeded from parameters
    pub fn run(&self) -> anyhow::Result<HeuristicResult<'a, T>> {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.params.seed);
        self.run_with_rng(&mut rng)
    }

    /// runs with a random generator provided by caller, used only for initial centroids
    pub fn run_with_rng<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> anyhow::Result<HeuristicResult<'a, T>> {
        log::info!(
            "heuristic on instance {}, nb points : {}, dim : {}, nb clusters : {}",
            self.instance.get_name(),
            self.instance.get_nb_points(),
            self.instance.get_dimension(),
            self.instance.get_total_clusters()
        );
        let cpu_start = ProcessTime::now();
        let sys_start = SystemTime::now();
        //
        let mut centroids = self.initial_centroids(rng)?;
        let mut iterations = 0;
        let (solution, status) = loop {
            let solution = self.assign(&centroids)?;
            iterations += 1;
            let (new_centroids, nb_moved) = self.update(&solution, &centroids)?;
            centroids = new_centroids;
            log::debug!("iteration {}, nb centroids moved : {}", iterations, nb_moved);
            if nb_moved == 0 {
                break (solution, Convergence::Converged);
            }
            if iterations >= self.params.max_iterations {
                log::warn!(
                    "heuristic stopped after {} iterations, {} centroids still moving",
                    iterations,
                    nb_moved
                );
                break (solution, Convergence::IterationLimit);
            }
        };
        //
        let cpu_time: Duration = cpu_start.elapsed();
        log::info!(
            "heuristic end : {:?} after {} iterations, objective : {:.3e}, nb misclassified : {}",
            status,
            iterations,
            solution.objective().to_f64().unwrap_or(f64::NAN),
            solution.nb_misclassified()?
        );
        log::info!(
            " sys time(ms) {:?} cpu time(ms) {:?}",
            sys_start.elapsed().unwrap_or_default().as_millis(),
            cpu_time.as_millis()
        );
        Ok(HeuristicResult {
            solution,
            centroids,
            status,
            iterations,
        })
    } // end of run_with_rng

    /// samples for each class as many points of the class as required clusters.
    /// Centroids are ordered by class. A class with clusters but no point gets None slots.
    pub fn initial_centroids<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> anyhow::Result<Vec<Option<Point<T>>>> {
        self.instance.check_clusters()?;
        let mut centroids = Vec::with_capacity(self.instance.get_total_clusters());
        for class in 0..self.instance.get_nb_classes() as u32 {
            for _ in 0..self.instance.get_clusters(class)? {
                let centroid = self.instance.random(rng, class).cloned();
                if centroid.is_none() {
                    log::debug!("class {} has no point, centroid slot left empty", class);
                }
                centroids.push(centroid);
            }
        }
        Ok(centroids)
    }

    // rank of nearest centroid of same class as point
    fn closest_centroid(
        &self,
        point: &Point<T>,
        centroids: &[Option<Point<T>>],
    ) -> anyhow::Result<usize> {
        let mut best: Option<(usize, T)> = None;
        for (j, centroid) in centroids.iter().enumerate() {
            let Some(centroid) = centroid else {
                continue;
            };
            if centroid.get_label() != point.get_label() {
                continue;
            }
            let dist = point.distance(centroid)?;
            if best.is_none_or(|(_, best_dist)| dist < best_dist) {
                best = Some((j, dist));
            }
        }
        match best {
            Some((j, _)) => Ok(j),
            None => Err(ClusterError::Configuration(format!(
                "no centroid for class {} of point {}",
                point.get_label(),
                point.get_id()
            ))
            .into()),
        }
    }

    /// builds a new solution with one cluster by centroid, each point going to the nearest centroid of its class
    pub fn assign(&self, centroids: &[Option<Point<T>>]) -> anyhow::Result<Solution<'a, T>> {
        let affected = self
            .instance
            .get_points()
            .par_iter()
            .map(|point| self.closest_centroid(point, centroids))
            .collect::<anyhow::Result<Vec<usize>>>()?;
        //
        let mut solution = Solution::with_empty_clusters(self.instance, centroids.len());
        for (rank, j) in affected.into_iter().enumerate() {
            solution.add_to(rank, j)?;
        }
        Ok(solution)
    }

    /// Computes centroid of cluster and pushes it away from misclassified points. See [Heuristic].
    pub fn repelled_centroid(&self, cluster: &Cluster<'a, T>) -> anyhow::Result<Option<Point<T>>> {
        let Some(mut centroid) = cluster.centroid()? else {
            return Ok(None);
        };
        let radius = cluster.distance_to_border(&centroid)?;
        let scale: T = from_f64(self.params.repulsion_scale);
        for foreign in cluster.misclassified()? {
            let dist = cluster.distance_to_border(foreign)?;
            let factor = if radius > T::zero() {
                let exponent = -(dist * dist) / (radius * radius);
                log::trace!(
                    "dist : {:?}, radius : {:?}, exponent : {:?}",
                    dist,
                    radius,
                    exponent
                );
                scale * exponent.exp()
            } else {
                from_f64(self.params.zero_radius_factor)
            };
            log::trace!("foreign point {} factor : {:?}", foreign.get_id(), factor);
            centroid.escape_from(foreign, factor)?;
        }
        Ok(Some(centroid))
    } // end of repelled_centroid

    /// recomputes centroids from the clusters of solution.
    /// Returns the new centroids and the number of slots that moved.
    /// A slot with no centroid and an empty cluster is skipped. A slot that did not move keeps its old centroid.
    pub fn update(
        &self,
        solution: &Solution<'a, T>,
        centroids: &[Option<Point<T>>],
    ) -> anyhow::Result<(Vec<Option<Point<T>>>, usize)> {
        if solution.size() != centroids.len() {
            return Err(ClusterError::DimensionMismatch {
                operation: "update centroids",
                expected: centroids.len(),
                got: solution.size(),
            }
            .into());
        }
        let tolerance: T = from_f64(self.params.move_tolerance);
        let candidates = solution
            .get_clusters()
            .par_iter()
            .zip(centroids.par_iter())
            .map(|(cluster, old)| {
                if old.is_none() && cluster.is_empty() {
                    return Ok(None);
                }
                self.repelled_centroid(cluster).map(Some)
            })
            .collect::<anyhow::Result<Vec<Option<Option<Point<T>>>>>>()?;
        //
        let mut new_centroids = centroids.to_vec();
        let mut nb_moved = 0;
        for (j, candidate) in candidates.into_iter().enumerate() {
            // slot skipped
            let Some(candidate) = candidate else {
                continue;
            };
            let moved = match (&centroids[j], &candidate) {
                (Some(old), Some(new)) => old.distance(new)? > tolerance,
                _ => true,
            };
            if moved {
                new_centroids[j] = candidate;
                nb_moved += 1;
            }
        }
        Ok((new_centroids, nb_moved))
    } // end of update
} // end of impl Heuristic

//========================================================

#[cfg(test)]
mod tests {

    use super::*;

    use crate::rect::generator::generate;

    use rand::distr::{Distribution, Uniform};

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    // n points by class in disk of radius 1 around each center
    fn separated_instance(centers: &[[f64; 2]], n: usize, seed: u64) -> Instance<f64> {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let unif = Uniform::<f64>::new(-0.7, 0.7).unwrap();
        let mut instance = Instance::<f64>::new("separated", centers.len());
        let mut id = 0;
        for (class, center) in centers.iter().enumerate() {
            for _ in 0..n {
                let xy = vec![
                    center[0] + unif.sample(&mut rng),
                    center[1] + unif.sample(&mut rng),
                ];
                instance.add(Point::new(id, xy, class as u32)).unwrap();
                id += 1;
            }
        }
        instance
    }

    fn boxes_overlap(c1: &Cluster<f64>, c2: &Cluster<f64>) -> bool {
        let (r1, r2) = (c1.get_rectangle().unwrap(), c2.get_rectangle().unwrap());
        (0..r1.get_dimension())
            .all(|d| r1.get_min()[d] <= r2.get_max()[d] && r2.get_min()[d] <= r1.get_max()[d])
    }

    #[test]
    fn test_separated_classes() {
        log_init_test();
        log::info!("in test_separated_classes");
        let instance = separated_instance(&[[0., 0.], [10., 10.]], 30, 234567_u64);
        let heuristic = Heuristic::new(&instance, HeuristicParams::default());
        let result = heuristic.run().unwrap();
        assert!(result.has_converged());
        assert!(result.iterations <= 3);
        let solution = &result.solution;
        assert_eq!(solution.size(), 2);
        assert_eq!(solution.nb_misclassified().unwrap(), 0);
        for class in 0..2 {
            let expected = Cluster::with_all_points(&instance, class).unwrap();
            assert_eq!(solution.get_cluster(class as usize).unwrap(), &expected);
            assert_eq!(solution.get_cluster(class as usize).unwrap().get_class(), Some(class));
        }
        assert!(!boxes_overlap(
            solution.get_cluster(0).unwrap(),
            solution.get_cluster(1).unwrap()
        ));
        // without foreign point centroid is the mean
        let mean = solution.get_cluster(0).unwrap().centroid().unwrap().unwrap();
        let centroid = result.centroids[0].as_ref().unwrap();
        assert!(centroid.distance(&mean).unwrap() < 1.0e-12);
    } // end of test_separated_classes

    #[test]
    fn test_foreign_point_repels() {
        log_init_test();
        log::info!("in test_foreign_point_repels");
        let clean = separated_instance(&[[0., 0.], [10., 10.]], 30, 4664397_u64);
        let clean_result = Heuristic::new(&clean, HeuristicParams::default())
            .run()
            .unwrap();
        let clean_centroid = clean_result.centroids[0].clone().unwrap();
        // inject a class 1 point inside class 0 box
        let mut polluted = clean.clone();
        polluted
            .add(Point::new(1000, vec![0.3, 0.2], 1))
            .unwrap();
        let result = Heuristic::new(&polluted, HeuristicParams::default())
            .run()
            .unwrap();
        assert!(result.has_converged());
        assert!(result.solution.nb_misclassified().unwrap() > 0);
        let centroid = result.centroids[0].clone().unwrap();
        let shift = centroid.distance(&clean_centroid).unwrap();
        assert!(shift > 0.);
        // the centroid moved away from the foreign point
        let foreign = polluted.get_point(polluted.get_nb_points() - 1).unwrap();
        assert!(
            centroid.distance(foreign).unwrap() > clean_centroid.distance(foreign).unwrap()
        );
        // class 0 membership is unchanged
        assert_eq!(
            result.solution.get_cluster(0).unwrap().get_members(),
            clean_result.solution.get_cluster(0).unwrap().get_members()
        );
    } // end of test_foreign_point_repels

    #[test]
    fn test_assign_idempotent() {
        log_init_test();
        let instance = generate(2, 200, 3, 0.4, 11).unwrap();
        let heuristic = Heuristic::new(&instance, HeuristicParams::default());
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7_u64);
        let centroids = heuristic.initial_centroids(&mut rng).unwrap();
        assert_eq!(centroids.len(), 6);
        let s1 = heuristic.assign(&centroids).unwrap();
        let s2 = heuristic.assign(&centroids).unwrap();
        assert_eq!(s1.size(), s2.size());
        for j in 0..s1.size() {
            assert_eq!(s1.get_cluster(j).unwrap(), s2.get_cluster(j).unwrap());
        }
        // each cluster has class of its centroid
        for (j, centroid) in centroids.iter().enumerate() {
            let cluster = s1.get_cluster(j).unwrap();
            let class = centroid.as_ref().unwrap().get_label();
            assert!(cluster.is_empty() || cluster.get_class() == Some(class));
        }
    }

    #[test]
    fn test_generated_partition() {
        log_init_test();
        log::info!("in test_generated_partition");
        let instance = generate(2, 300, 3, 0.4, 11).unwrap();
        let params = HeuristicParams::default().with_max_iterations(200);
        let result = Heuristic::new(&instance, params).run().unwrap();
        assert!(result.iterations <= 200);
        assert_eq!(result.solution.size(), instance.get_total_clusters());
        assert_eq!(result.centroids.len(), instance.get_total_clusters());
        // every point in exactly one cluster of its class
        let affectation = result.solution.affectation().unwrap();
        for (rank, p) in instance.iter().enumerate() {
            let j = affectation.get_labels()[rank];
            assert_eq!(
                result.solution.get_cluster(j).unwrap().get_class(),
                Some(p.get_label())
            );
        }
        // same seed same run
        let again = Heuristic::new(&instance, params).run().unwrap();
        assert_eq!(again.iterations, result.iterations);
        assert_eq!(again.centroids, result.centroids);
    } // end of test_generated_partition

    #[test]
    fn test_single_point_cluster() {
        log_init_test();
        let mut instance = Instance::<f64>::new("single", 2);
        instance.add(Point::new(0, vec![5., 5.], 0)).unwrap();
        instance.add(Point::new(1, vec![0., 0.], 1)).unwrap();
        instance.add(Point::new(2, vec![1., 0.], 1)).unwrap();
        let heuristic = Heuristic::new(&instance, HeuristicParams::default());
        let single = Cluster::singleton(&instance, 0).unwrap();
        let centroid = heuristic.repelled_centroid(&single).unwrap().unwrap();
        assert_eq!(&centroid, instance.get_point(0).unwrap());
        let result = heuristic.run().unwrap();
        assert!(result.has_converged());
        assert_eq!(result.centroids[0].as_ref().unwrap().get_position(), &[5., 5.]);
    }

    #[test]
    fn test_zero_radius_with_foreign() {
        log_init_test();
        // class 0 points on a segment, class 1 point on it : box is flat and radius is 0
        let mut instance = Instance::<f64>::new("flat", 2);
        instance.add(Point::new(0, vec![0., 0.], 0)).unwrap();
        instance.add(Point::new(1, vec![4., 0.], 0)).unwrap();
        instance.add(Point::new(2, vec![1., 0.], 1)).unwrap();
        let params = HeuristicParams::default();
        let heuristic = Heuristic::new(&instance, params);
        let cluster = Cluster::with_all_points(&instance, 0).unwrap();
        let centroid = heuristic.repelled_centroid(&cluster).unwrap().unwrap();
        // mean (2,0) escapes from (1,0) with zero radius factor
        let expected = 2. + (2. - 1.) * params.get_zero_radius_factor();
        assert!((centroid.get(0).unwrap() - expected).abs() < 1.0e-12);
        assert_eq!(centroid.get(1).unwrap(), 0.);
        assert!(centroid.get_position().iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_missing_cluster_config() {
        log_init_test();
        let mut instance = separated_instance(&[[0., 0.], [10., 10.]], 5, 1_u64);
        instance.set_clusters(1, 0).unwrap();
        let err = Heuristic::new(&instance, HeuristicParams::default())
            .run()
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ClusterError>(),
            Some(ClusterError::Configuration(_))
        ));
    }

    #[test]
    fn test_empty_class_slot() {
        log_init_test();
        // class 2 has clusters but no point
        let mut instance = separated_instance(&[[0., 0.], [10., 10.]], 5, 2_u64);
        let mut bigger = Instance::<f64>::with_clusters("bigger", 3, 1);
        for p in instance.iter() {
            bigger.add(p.clone()).unwrap();
        }
        instance = bigger;
        let result = Heuristic::new(&instance, HeuristicParams::default())
            .run()
            .unwrap();
        assert!(result.has_converged());
        assert_eq!(result.centroids.len(), 3);
        assert!(result.centroids[2].is_none());
        assert!(result.solution.get_cluster(2).unwrap().is_empty());
    }

    #[test]
    fn test_emptied_slot() {
        log_init_test();
        // two centroids of class 0 at the same place, ties go to the first one
        let mut instance = Instance::<f64>::with_clusters("twin", 1, 2);
        for (id, x) in [0., 1., 2.].iter().enumerate() {
            instance.add(Point::new(id, vec![*x, 0.], 0)).unwrap();
        }
        let heuristic = Heuristic::new(&instance, HeuristicParams::default());
        let centroids = vec![
            Some(Point::new(0, vec![0., 0.], 0)),
            Some(Point::new(0, vec![0., 0.], 0)),
        ];
        let solution = heuristic.assign(&centroids).unwrap();
        assert_eq!(solution.get_cluster(0).unwrap().size(), 3);
        assert!(solution.get_cluster(1).unwrap().is_empty());
        let (centroids, nb_moved) = heuristic.update(&solution, &centroids).unwrap();
        assert_eq!(nb_moved, 2);
        assert_eq!(centroids[0].as_ref().unwrap().get_position(), &[1., 0.]);
        assert!(centroids[1].is_none());
        // the emptied slot is now skipped
        let solution = heuristic.assign(&centroids).unwrap();
        assert!(solution.get_cluster(1).unwrap().is_empty());
        let (again, nb_moved) = heuristic.update(&solution, &centroids).unwrap();
        assert_eq!(nb_moved, 0);
        assert_eq!(again, centroids);
    }

    #[test]
    fn test_iteration_limit() {
        log_init_test();
        let instance = separated_instance(&[[0., 0.], [10., 10.]], 10, 3_u64);
        // first update always moves centroids from sampled points to means
        let params = HeuristicParams::new(3_u64, 1);
        assert_eq!(params.get_seed(), 3);
        assert_eq!(params.get_max_iterations(), 1);
        let result = Heuristic::new(&instance, params).run().unwrap();
        assert_eq!(result.status, Convergence::IterationLimit);
        assert_eq!(result.iterations, 1);
    }
} // end of mod tests
