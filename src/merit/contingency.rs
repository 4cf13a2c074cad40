//! contingency table

use ndarray::{Array1, Array2, Axis};
use num_traits::int::PrimInt;

use super::affect::*;
use crate::error::{ClusterError, check_index};

//================================================================================

// number of pairs in n
fn pairs(n: usize) -> f64 {
    (n as f64) * (n as f64 - 1.) / 2.
}

/// Contingency table associated to the 2 affectations to compare
/// We can compare either a true (reference) labels of data or 2 clusters algorithms
#[derive(Debug, Clone)]
pub struct Contingency {
    // The contingency table. dimension (cluster1.nb_cluster, cluster2.nb_cluster)
    table: Array2<usize>,
    // number of elements in each clusters of cluster1
    c1_size: Array1<usize>,
    // number of elements in each clusters of cluster2
    c2_size: Array1<usize>,
}

impl Contingency {
    /// Each data of clusters1 must be affected in clusters2.
    pub fn new<DataId, L1, L2, C1, C2>(clusters1: &C1, clusters2: &C2) -> anyhow::Result<Self>
    where
        DataId: Copy + std::fmt::Debug,
        L1: PrimInt,
        L2: PrimInt,
        C1: Affectation<DataId, L1>,
        C2: Affectation<DataId, L2>,
    {
        let nbclust1 = clusters1.get_nb_cluster();
        let nbclust2 = clusters2.get_nb_cluster();
        if clusters1.get_nb_data() != clusters2.get_nb_data() {
            return Err(ClusterError::NotAPartition(format!(
                "affectations have {} and {} data",
                clusters1.get_nb_data(),
                clusters2.get_nb_data()
            ))
            .into());
        }
        let mut table = Array2::<usize>::zeros((nbclust1, nbclust2));
        for (id, label1) in clusters1.iter() {
            let Some(label2) = clusters2.get_affectation(id) else {
                return Err(ClusterError::NotAPartition(format!(
                    "data {:?} not affected in second clusterization",
                    id
                ))
                .into());
            };
            let i = label1.to_usize().unwrap_or(usize::MAX);
            let j = label2.to_usize().unwrap_or(usize::MAX);
            check_index("label", i, nbclust1)?;
            check_index("label", j, nbclust2)?;
            table[[i, j]] += 1;
        }
        let c1_size = table.sum_axis(Axis(1));
        let c2_size = table.sum_axis(Axis(0));
        log::debug!(
            "contingency table ({}, {}), nb data : {}",
            nbclust1,
            nbclust2,
            c1_size.sum()
        );
        Ok(Contingency {
            table,
            c1_size,
            c2_size,
        })
    } // end of new

    pub fn get_table(&self) -> &Array2<usize> {
        &self.table
    }

    /// sizes of clusters of first affectation
    pub fn get_c1_size(&self) -> &Array1<usize> {
        &self.c1_size
    }

    /// sizes of clusters of second affectation
    pub fn get_c2_size(&self) -> &Array1<usize> {
        &self.c2_size
    }

    pub fn get_nb_data(&self) -> usize {
        self.c1_size.sum()
    }

    // returns (pairs together in both, pairs together in 1, pairs together in 2, all pairs)
    fn pair_counts(&self) -> (f64, f64, f64, f64) {
        let both = self.table.iter().map(|n| pairs(*n)).sum::<f64>();
        let in1 = self.c1_size.iter().map(|n| pairs(*n)).sum::<f64>();
        let in2 = self.c2_size.iter().map(|n| pairs(*n)).sum::<f64>();
        (both, in1, in2, pairs(self.get_nb_data()))
    }

    /// fraction of pairs of data on which the 2 clusterizations agree. 1. if less than 2 data.
    pub fn rand_index(&self) -> f64 {
        let (both, in1, in2, all) = self.pair_counts();
        if all <= 0. {
            return 1.;
        }
        (all + 2. * both - in1 - in2) / all
    }

    /// Rand index adjusted for chance (Hubert-Arabie). 1. for identical partitions.
    pub fn adjusted_rand_index(&self) -> f64 {
        let (both, in1, in2, all) = self.pair_counts();
        if all <= 0. {
            return 1.;
        }
        let expected = in1 * in2 / all;
        let max_index = 0.5 * (in1 + in2);
        if max_index == expected {
            return 1.;
        }
        (both - expected) / (max_index - expected)
    }
} // end of Contingency

//========================================================

#[cfg(test)]
mod tests {

    use super::*;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_identical_up_to_relabel() {
        log_init_test();
        let a1 = VecAffectation::new(vec![0u32, 0, 1, 1, 2, 2], 3);
        let a2 = VecAffectation::new(vec![2usize, 2, 0, 0, 1, 1], 3);
        let contingency = Contingency::new(&a1, &a2).unwrap();
        assert_eq!(contingency.get_table()[[0, 2]], 2);
        assert_eq!(contingency.get_c1_size().to_vec(), vec![2, 2, 2]);
        assert_eq!(contingency.get_nb_data(), 6);
        assert!((contingency.rand_index() - 1.).abs() < 1.0e-12);
        assert!((contingency.adjusted_rand_index() - 1.).abs() < 1.0e-12);
    }

    #[test]
    fn test_crossed() {
        let a1 = VecAffectation::new(vec![0u32, 0, 1, 1], 2);
        let a2 = VecAffectation::new(vec![0u32, 1, 0, 1], 2);
        let contingency = Contingency::new(&a1, &a2).unwrap();
        assert!((contingency.rand_index() - 1. / 3.).abs() < 1.0e-12);
        assert!((contingency.adjusted_rand_index() + 0.5).abs() < 1.0e-12);
    }

    #[test]
    fn test_bad_affectations() {
        let a1 = VecAffectation::new(vec![0u32, 0, 1], 2);
        let shorter = VecAffectation::new(vec![0u32, 1], 2);
        assert!(Contingency::new(&a1, &shorter).is_err());
        let bad_label = VecAffectation::new(vec![0u32, 1, 4], 2);
        let err = Contingency::new(&a1, &bad_label).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ClusterError>(),
            Some(ClusterError::OutOfRange { index: 4, .. })
        ));
    }
} // end of mod tests
