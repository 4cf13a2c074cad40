//! csv dumps of instances, solutions and centroids.
//!
//! They are meant for external tools (plotting of points and rectangles, exact model).
//! - instance : one row by point `id,label,x0,..,x{d-1}` with a header.
//! - solution : one row by (cluster, dimension) giving min and max of the cluster box.
//! - centroids : one row by (slot, dimension).

use anyhow::anyhow;
use num_traits::float::Float;
use serde::{Deserialize, Serialize};

use std::fmt::Debug;
use std::fs::OpenOptions;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::rect::instance::Instance;
use crate::rect::point::Point;
use crate::rect::solution::Solution;

/// one dimension of the box of a cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxRecord {
    pub cluster: usize,
    pub class: u32,
    pub size: usize,
    pub dim: usize,
    pub min: f64,
    pub max: f64,
}

/// one coordinate of a centroid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentroidRecord {
    pub slot: usize,
    pub class: u32,
    pub dim: usize,
    pub value: f64,
}

fn to_f64<T: Float>(x: T) -> f64 {
    x.to_f64().unwrap_or(f64::NAN)
}

/// dumps points of an instance
pub fn write_instance_csv<T>(instance: &Instance<T>, path: &Path) -> anyhow::Result<()>
where
    T: Float + Debug,
{
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    let mut wtr = csv::Writer::from_writer(BufWriter::new(file));
    let mut header = vec!["id".to_string(), "label".to_string()];
    header.extend((0..instance.get_dimension()).map(|d| format!("x{}", d)));
    wtr.write_record(&header)?;
    for p in instance.iter() {
        let mut record = vec![p.get_id().to_string(), p.get_label().to_string()];
        record.extend(p.get_position().iter().map(|x| to_f64(*x).to_string()));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    log::info!(
        "wrote {} points of instance {} in {}",
        instance.get_nb_points(),
        instance.get_name(),
        path.display()
    );
    Ok(())
} // end of write_instance_csv

/// reads a file written by [write_instance_csv]. Each class requires one cluster.
pub fn read_instance_csv(path: &Path, name: &str, nb_classes: usize) -> anyhow::Result<Instance<f64>> {
    let fileres = OpenOptions::new().read(true).open(path);
    if fileres.is_err() {
        log::error!("read_instance_csv could not open {:?}", path.as_os_str());
        return Err(anyhow!(
            "read_instance_csv could not open file {}",
            path.display()
        ));
    }
    let file = fileres?;
    let mut rdr = csv::Reader::from_reader(BufReader::new(file));
    let mut instance = Instance::<f64>::new(name, nb_classes);
    for (num_record, result) in rdr.records().enumerate() {
        let record = result?;
        if record.len() < 3 {
            return Err(anyhow!(
                "record {} has {} fields, expected at least 3",
                num_record,
                record.len()
            ));
        }
        let id: usize = record[0].trim().parse()?;
        let label: u32 = record[1].trim().parse()?;
        let p = record
            .iter()
            .skip(2)
            .map(|field| field.trim().parse::<f64>())
            .collect::<Result<Vec<f64>, _>>()?;
        instance.add(Point::new(id, p, label))?;
    }
    log::info!(
        "read {} points of dimension {} from {}",
        instance.get_nb_points(),
        instance.get_dimension(),
        path.display()
    );
    Ok(instance)
} // end of read_instance_csv

/// box rows of the non empty clusters of a solution
pub fn solution_records<T>(solution: &Solution<T>) -> Vec<BoxRecord>
where
    T: Float + Debug,
{
    let mut records = Vec::new();
    for (j, cluster) in solution.get_clusters().iter().enumerate() {
        let (Some(class), Some(rectangle)) = (cluster.get_class(), cluster.get_rectangle()) else {
            continue;
        };
        for dim in 0..rectangle.get_dimension() {
            records.push(BoxRecord {
                cluster: j,
                class,
                size: cluster.size(),
                dim,
                min: to_f64(rectangle.get_min()[dim]),
                max: to_f64(rectangle.get_max()[dim]),
            });
        }
    }
    records
}

/// dumps boxes of a solution, empty clusters are not dumped.
pub fn write_solution_csv<T>(solution: &Solution<T>, path: &Path) -> anyhow::Result<()>
where
    T: Float + Debug,
{
    let mut wtr = csv::Writer::from_path(path)?;
    for record in solution_records(solution) {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// reads boxes written by [write_solution_csv]
pub fn read_solution_csv(path: &Path) -> anyhow::Result<Vec<BoxRecord>> {
    let mut rdr = csv::Reader::from_path(path)?;
    let records = rdr
        .deserialize()
        .collect::<Result<Vec<BoxRecord>, csv::Error>>()?;
    Ok(records)
}

/// dumps centroids, empty slots are not dumped
pub fn write_centroids_csv<T>(centroids: &[Option<Point<T>>], path: &Path) -> anyhow::Result<()>
where
    T: Float + Debug,
{
    let mut wtr = csv::Writer::from_path(path)?;
    for (slot, centroid) in centroids.iter().enumerate() {
        let Some(centroid) = centroid else {
            continue;
        };
        for (dim, x) in centroid.get_position().iter().enumerate() {
            wtr.serialize(CentroidRecord {
                slot,
                class: centroid.get_label(),
                dim,
                value: to_f64(*x),
            })?;
        }
    }
    wtr.flush()?;
    Ok(())
}

//========================================================

// end of mod tests
