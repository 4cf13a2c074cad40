//! This module is dedicated to comparison of clusterizations.
//! It serves to compare a heuristic solution with the true classes or with a solution
//! coming from an exact model, using a contingency table and Rand indexes as described in :
//! - Vinh.N.X Information Theoretic Measures for clustering comparison: (Vinh 2010)[https://jmlr.csail.mit.edu/papers/volume11/vinh10a/vinh10a.pdf]
//!

pub mod affect;
pub mod contingency;

pub use affect::*;
pub use contingency::*;
