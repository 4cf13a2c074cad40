//! error conditions raised by points, clusters, instances and the heuristic.
//!
//! All fallible functions of the crate return an `anyhow::Result`, the typed condition
//! can be recovered with `err.downcast_ref::<ClusterError>()`.

/// Conditions detected inside entity operations. They are never recovered by the heuristic.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClusterError {
    /// binary operation between points (or point and cluster) of different dimensions
    #[error("{operation} : dimension mismatch, expected {expected}, got {got}")]
    DimensionMismatch {
        operation: &'static str,
        expected: usize,
        got: usize,
    },

    /// access to a coordinate, a point rank or a class outside its range
    #[error("out of range {what} index : {index}, must be < {bound}")]
    OutOfRange {
        what: &'static str,
        index: usize,
        bound: usize,
    },

    /// point added to a cluster of another class
    #[error("point of class {point_class} added to class {cluster_class} cluster")]
    ClassViolation { point_class: u32, cluster_class: u32 },

    /// division of a point by zero
    #[error("dividing a point by zero")]
    DivisionByZero,

    /// geometric query that requires a bounding box on an empty cluster
    #[error("{operation} : cluster is empty")]
    EmptyCluster { operation: &'static str },

    /// inconsistent instance or heuristic parameters
    #[error("configuration error : {0}")]
    Configuration(String),

    /// a solution which does not put each point in exactly one cluster
    #[error("solution is not a partition : {0}")]
    NotAPartition(String),
}

// check that two dimensions are equal
pub(crate) fn check_dim(operation: &'static str, expected: usize, got: usize) -> anyhow::Result<()> {
    if expected != got {
        return Err(ClusterError::DimensionMismatch {
            operation,
            expected,
            got,
        }
        .into());
    }
    Ok(())
}

// check index < bound
pub(crate) fn check_index(what: &'static str, index: usize, bound: usize) -> anyhow::Result<()> {
    if index >= bound {
        return Err(ClusterError::OutOfRange { what, index, bound }.into());
    }
    Ok(())
}
