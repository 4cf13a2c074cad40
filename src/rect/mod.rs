//! This module implements the clustering of labeled points in rectangles.
//! Each class must be split in a given number of clusters, and the axis aligned boxes (rectangles)
//! enclosing the clusters should contain as few points of other classes as possible.
//!
//! The heuristic produces a [Solution](solution::Solution), the same representation an exact
//! model would produce so that objectives (sum of diagonals, number of misclassified points) can be compared.

pub mod cluster;
pub mod generator;
pub mod heuristic;
pub mod instance;
pub mod point;
pub mod solution;

pub use cluster::{Cluster, Rectangle};
pub use heuristic::{Convergence, Heuristic, HeuristicParams, HeuristicResult};
pub use instance::Instance;
pub use point::{Point, PointId};
pub use solution::Solution;
