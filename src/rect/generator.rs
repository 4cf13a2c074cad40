//! random generation of 2 classes instances, points are drawn uniformly in boxes around random centers.

use rand_distr::{Distribution, Uniform};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;

use super::instance::Instance;
use super::point::{Point, PointId};

// a point with coordinates uniform in [-range/2, range/2[
fn random_point<R: Rng + ?Sized>(
    rng: &mut R,
    unif_01: &Uniform<f64>,
    id: PointId,
    class: u32,
    dim: usize,
    range: f64,
) -> Point<f64> {
    let p: Vec<f64> = (0..dim)
        .map(|_| range * unif_01.sample(rng) - range / 2.)
        .collect();
    Point::new(id, p, class)
}

/// generates an instance of 2 classes with clusters_by_class clusters required in each class.
/// 2 * clusters_by_class centers are drawn in [-1,1]^dim, centers of rank < clusters_by_class are of class 0.
/// Each of the nb_points points is drawn around a random center in a box of side dispersion.
/// A last point of class 1 is added around the first center (of class 0) so that classes overlap.
pub fn generate(
    dim: usize,
    nb_points: usize,
    clusters_by_class: usize,
    dispersion: f64,
    seed: u64,
) -> anyhow::Result<Instance<f64>> {
    let name = format!(
        "R({},{},{},{},{})",
        dim, nb_points, clusters_by_class, dispersion, seed
    );
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let unif_01 = Uniform::<f64>::new(0., 1.)?;
    let mut instance = Instance::<f64>::with_clusters(&name, 2, clusters_by_class);
    if clusters_by_class == 0 {
        return Ok(instance);
    }
    //
    let nb_centers = 2 * clusters_by_class;
    let centers: Vec<Point<f64>> = (0..nb_centers)
        .map(|i| {
            let class = (i / clusters_by_class) as u32;
            random_point(&mut rng, &unif_01, 0, class, dim, 2.)
        })
        .collect();
    for i in 0..nb_points {
        let j = rng.random_range(0..nb_centers);
        let mut point = random_point(
            &mut rng,
            &unif_01,
            i + 1,
            centers[j].get_label(),
            dim,
            dispersion,
        );
        point.sum(&centers[j])?;
        instance.add(point)?;
    }
    let mut intruder = random_point(&mut rng, &unif_01, nb_points + 1, 1, dim, dispersion);
    intruder.sum(&centers[0])?;
    instance.add(intruder)?;
    //
    log::debug!(
        "generated instance {} with {} points",
        instance.get_name(),
        instance.get_nb_points()
    );
    Ok(instance)
} // end of generate

//========================================================

#[cfg(test)]
mod tests {

    use super::*;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_generate() {
        log_init_test();
        let instance = generate(3, 100, 2, 0.4, 11).unwrap();
        assert_eq!(instance.get_name(), "R(3,100,2,0.4,11)");
        assert_eq!(instance.get_nb_points(), 101);
        assert_eq!(instance.get_dimension(), 3);
        assert_eq!(instance.get_total_clusters(), 4);
        // centers in [-1,1], points at most dispersion/2 away
        for d in 0..3 {
            assert!(instance.min(d).unwrap() >= -1.2);
            assert!(instance.max(d).unwrap() <= 1.2);
        }
        let last = instance.get_point(100).unwrap();
        assert_eq!(last.get_label(), 1);
        assert_eq!(last.get_id(), 101);
        // reproducible
        let again = generate(3, 100, 2, 0.4, 11).unwrap();
        assert_eq!(instance.get_points(), again.get_points());
        let other = generate(3, 100, 2, 0.4, 12).unwrap();
        assert_ne!(instance.get_points(), other.get_points());
    }
} // end of mod tests
