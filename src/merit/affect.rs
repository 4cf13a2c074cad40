//! describes affectation of data to clusters

use num_traits::int::PrimInt;

/// The cluster affectation of any clustering scheme should be able to provide a structure implementing this trait.
///
/// Typically an affectation abstract a clusterization as something giving the label or the rank of the cluster attached to a dataid.  
/// Morally The label is a discrete value (satisfy the PrimInt trait).
///
pub trait Affectation<DataId, DataLabel> {
    /// given a dataId, returns its label or cluster Id, None if dataid is unknown
    fn get_affectation(&self, dataid: DataId) -> Option<DataLabel>;
    /// returns the number of labels (or clusters)
    fn get_nb_cluster(&self) -> usize;
    /// returns the number of data affected
    fn get_nb_data(&self) -> usize;
    /// iterator on couples (dataid, label)
    fn iter(&self) -> impl Iterator<Item = (DataId, DataLabel)>;
}

//===============================================================================

/// Clusters defined by a Vec, DataId is an usize Vec[i] gives the label of the i-th data.
/// For a solution or an instance the i-th data is the point of rank i.
#[derive(Debug, Clone)]
pub struct VecAffectation<DataLabel> {
    affectation: Vec<DataLabel>,
    nb_cluster: usize,
}

impl<DataLabel> VecAffectation<DataLabel> {
    /// builds a vector affectation
    pub fn new(affectation: Vec<DataLabel>, nb_cluster: usize) -> Self {
        VecAffectation {
            affectation,
            nb_cluster,
        }
    }

    pub fn get_labels(&self) -> &[DataLabel] {
        &self.affectation
    }
}

impl<DataLabel> Affectation<usize, DataLabel> for VecAffectation<DataLabel>
where
    DataLabel: PrimInt,
{
    fn get_affectation(&self, id: usize) -> Option<DataLabel> {
        self.affectation.get(id).copied()
    }

    fn get_nb_cluster(&self) -> usize {
        self.nb_cluster
    }

    fn get_nb_data(&self) -> usize {
        self.affectation.len()
    }

    fn iter(&self) -> impl Iterator<Item = (usize, DataLabel)> {
        self.affectation.iter().copied().enumerate()
    }
}
