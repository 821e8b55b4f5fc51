#![allow(dead_code)]

use ndarray::Array2;
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{
    Rng,
    SeedableRng,
};
use scprep::{
    AnnotatedData,
    CountMatrix,
};
use sprs::{
    CsMat,
    TriMat,
};

pub const SEED: u64 = 42;

/// Poisson-like counts, roughly a third of the entries zero.
pub fn random_counts(
    rng: &mut StdRng,
    n_rows: usize,
    n_cols: usize,
) -> Array2<f64> {
    Array2::from_shape_fn((n_rows, n_cols), |_| {
        if rng.gen_bool(0.3) {
            0.0
        }
        else {
            rng.gen_range(1..50) as f64
        }
    })
}

pub fn to_csr(dense: &Array2<f64>) -> CsMat<f64> {
    let mut triplets = TriMat::new(dense.dim());
    for ((row, col), value) in dense.indexed_iter() {
        if *value != 0.0 {
            triplets.add_triplet(row, col, *value);
        }
    }
    triplets.to_csr()
}

/// Dataset with a `batch` column of the given labels.
pub fn batched(
    x: CountMatrix,
    labels: &[&str],
) -> AnnotatedData {
    let obs = df!("batch" => labels).unwrap();
    AnnotatedData::new(x, obs).unwrap()
}

/// Two batches, rows `0..n_a` in `A` and the rest in `B`.
pub fn two_batches(
    n_a: usize,
    n_b: usize,
    n_cols: usize,
) -> (Array2<f64>, Vec<&'static str>) {
    let mut rng = StdRng::seed_from_u64(SEED);
    let counts = random_counts(&mut rng, n_a + n_b, n_cols);
    let labels = std::iter::repeat("A")
        .take(n_a)
        .chain(std::iter::repeat("B").take(n_b))
        .collect();
    (counts, labels)
}
