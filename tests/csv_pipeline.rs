mod common;

use assert_approx_eq::assert_approx_eq;
use scprep::io::{
    read_counts_csv,
    read_dataset,
    read_obs_csv,
    write_counts_csv,
    write_obs_csv,
};
use scprep::prelude::*;
use tempfile::tempdir;

const COUNTS: &str = "\
GeneA,GeneB,GeneC
3,0,1
0,0,0
10,5,5
2,2,0
";

const OBS: &str = "\
batch,donor
a,d1
a,d1
b,d2
b,d2
";

#[test]
fn filter_then_compute_library_size() {
    let dir = tempdir().unwrap();
    let counts_path = dir.path().join("counts.csv");
    let obs_path = dir.path().join("obs.csv");
    std::fs::write(&counts_path, COUNTS).unwrap();
    std::fs::write(&obs_path, OBS).unwrap();

    let adata = read_dataset(&counts_path, Some(&obs_path), b',').unwrap();
    assert_eq!(adata.var_names(), &["GeneA", "GeneB", "GeneC"]);
    assert!(check_nonnegative_integers(adata.x()));

    let mut filtered = filter_cells_by_count(&adata, 1.0).unwrap();
    assert_eq!(filtered.n_obs(), 3);

    let config = LibrarySizeConfig::new("batch");
    compute_library_size_batch(&mut filtered, &config).unwrap();
    let means = filtered.obs_f32(DEFAULT_LOCAL_L_MEAN_KEY).unwrap();
    assert_approx_eq!(means[0], 4f32.ln(), 1e-6);
    assert_approx_eq!(means[1], (20f32.ln() + 4f32.ln()) / 2.0, 1e-6);

    let out_obs = dir.path().join("obs_out.tsv");
    let out_counts = dir.path().join("counts_out.tsv");
    write_obs_csv(filtered.obs(), &out_obs, b'\t').unwrap();
    write_counts_csv(filtered.x(), filtered.var_names(), &out_counts, b'\t').unwrap();

    let obs = read_obs_csv(&out_obs, b'\t').unwrap();
    assert_eq!(obs.height(), 3);
    assert!(obs.get_column_index(DEFAULT_LOCAL_L_VAR_KEY).is_some());
    let (matrix, names) = read_counts_csv(&out_counts, b'\t').unwrap();
    assert_eq!(names.len(), 3);
    assert_eq!(matrix.row_sums().to_vec(), vec![4.0, 20.0, 4.0]);
}

#[test]
fn fractional_counts_fail_validation() {
    let dir = tempdir().unwrap();
    let counts_path = dir.path().join("counts.csv");
    std::fs::write(&counts_path, "a,b\n1,2.5\n0,3\n").unwrap();
    let (matrix, _) = read_counts_csv(&counts_path, b',').unwrap();
    assert!(!check_nonnegative_integers(&matrix));
}

#[test]
fn missing_obs_rows_are_rejected() {
    let dir = tempdir().unwrap();
    let counts_path = dir.path().join("counts.csv");
    let obs_path = dir.path().join("obs.csv");
    std::fs::write(&counts_path, COUNTS).unwrap();
    std::fs::write(&obs_path, "batch\na\nb\n").unwrap();

    let err = read_dataset(&counts_path, Some(&obs_path), b',').unwrap_err();
    let config_err = err.downcast_ref::<ConfigurationError>();
    assert!(matches!(
        config_err,
        Some(ConfigurationError::ShapeMismatch { expected: 4, actual: 2, .. })
    ));
}
