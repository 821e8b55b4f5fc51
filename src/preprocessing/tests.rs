mod library_size_tests {
    use assert_approx_eq::assert_approx_eq;
    use ndarray::{
        array,
        Array2,
    };
    use rstest::rstest;
    use sprs::TriMat;

    use crate::data_structs::CountMatrix;
    use crate::preprocessing::{
        compute_library_size,
        compute_library_size_with,
        EmptyRowPolicy,
        LibrarySize,
    };

    fn with_empty_row() -> CountMatrix {
        CountMatrix::dense(array![[3.0, 0.0], [0.0, 0.0], [1.0, 6.0]])
    }

    #[test]
    fn test_log_counts_match_ln_of_totals() {
        let matrix = CountMatrix::dense(array![[1.0, 9.0], [50.0, 50.0], [2.0, 0.0]]);
        let stats = compute_library_size(&matrix);
        for (value, total) in stats.log_counts.iter().zip([10.0f64, 100.0, 2.0]) {
            assert_approx_eq!(*value as f64, total.ln(), 1e-6);
        }
        assert!(!stats.has_empty_rows());
    }

    #[test]
    fn test_mean_and_var_broadcast_to_column() {
        let e = std::f64::consts::E;
        let matrix = CountMatrix::dense(array![[e], [e * e]]);
        let stats = compute_library_size(&matrix);

        assert_eq!(stats.local_mean.dim(), (2, 1));
        assert_eq!(stats.local_var.dim(), (2, 1));
        for value in stats.local_mean.iter() {
            assert_approx_eq!(*value, 1.5f32, 1e-6);
        }
        for value in stats.local_var.iter() {
            assert_approx_eq!(*value, 0.25f32, 1e-6);
        }
    }

    #[rstest]
    #[case::exclude(EmptyRowPolicy::Exclude, vec![3f64.ln(), 7f64.ln()])]
    #[case::fill_zero(EmptyRowPolicy::FillZero, vec![3f64.ln(), 0.0, 7f64.ln()])]
    fn test_empty_row_policy(
        #[case] policy: EmptyRowPolicy,
        #[case] reduced: Vec<f64>,
    ) {
        let stats = compute_library_size_with(&with_empty_row(), policy);
        let n = reduced.len() as f64;
        let mean = reduced.iter().sum::<f64>() / n;
        let var = reduced.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        assert_approx_eq!(stats.mean().unwrap() as f64, mean, 1e-6);
        assert_approx_eq!(stats.var().unwrap() as f64, var, 1e-6);
        assert_eq!(stats.empty_rows, vec![1]);
        assert_eq!(stats.log_counts[1], 0.0);
    }

    #[test]
    fn test_empty_row_policies_differ() {
        let excluded = compute_library_size_with(&with_empty_row(), EmptyRowPolicy::Exclude);
        let filled = compute_library_size_with(&with_empty_row(), EmptyRowPolicy::FillZero);
        assert!(filled.mean().unwrap() < excluded.mean().unwrap());
    }

    #[rstest]
    #[case::exclude(EmptyRowPolicy::Exclude)]
    #[case::fill_zero(EmptyRowPolicy::FillZero)]
    fn test_all_rows_empty_stays_finite(#[case] policy: EmptyRowPolicy) {
        let stats = compute_library_size_with(&CountMatrix::dense(Array2::zeros((3, 2))), policy);
        assert_eq!(stats.empty_rows, vec![0, 1, 2]);
        assert!(stats.local_mean.iter().all(|v| v.is_finite()));
        assert!(stats.local_var.iter().all(|v| v.is_finite()));
        assert!(stats.log_counts.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_sparse_equals_dense() {
        let mut tri = TriMat::new((3, 2));
        tri.add_triplet(0, 0, 3.0);
        tri.add_triplet(2, 0, 1.0);
        tri.add_triplet(2, 1, 6.0);
        let sparse = compute_library_size(&CountMatrix::sparse(tri.to_csr()));
        let dense = compute_library_size(&with_empty_row());
        assert_eq!(sparse, dense);
    }

    #[test]
    fn test_no_rows() {
        let stats = LibrarySize::from_totals(&[], EmptyRowPolicy::Exclude);
        assert!(stats.log_counts.is_empty());
        assert_eq!(stats.local_mean.dim(), (0, 1));
        assert_eq!(stats.mean(), None);
    }
}

mod validation_tests {
    use ndarray::{
        array,
        Array2,
    };
    use rstest::rstest;
    use sprs::TriMat;

    use crate::data_structs::CountMatrix;
    use crate::preprocessing::{
        all_nonnegative_integers,
        check_nonnegative_integers,
    };

    #[rstest]
    #[case::negative(array![[1.0, -1.0], [0.0, 2.0]], false)]
    #[case::fractional(array![[1.0, 2.5], [0.0, 2.0]], false)]
    #[case::zeros(Array2::zeros((2, 3)), true)]
    #[case::counts(array![[1.0, 20.0], [0.0, 300.0]], true)]
    #[case::empty(Array2::zeros((0, 0)), true)]
    #[case::nan(array![[f64::NAN]], false)]
    #[case::infinite(array![[f64::INFINITY]], false)]
    fn test_dense(
        #[case] values: Array2<f64>,
        #[case] expected: bool,
    ) {
        assert_eq!(check_nonnegative_integers(&CountMatrix::dense(values)), expected);
    }

    #[test]
    fn test_sparse_scans_stored_values() {
        let mut tri = TriMat::new((100, 100));
        tri.add_triplet(5, 7, 4.0);
        let valid = CountMatrix::sparse(tri.to_csr());
        assert!(check_nonnegative_integers(&valid));

        let mut tri = TriMat::new((100, 100));
        tri.add_triplet(5, 7, 0.5);
        let invalid = CountMatrix::sparse(tri.to_csr());
        assert!(!check_nonnegative_integers(&invalid));
    }

    #[test]
    fn test_negative_zero_is_valid() {
        assert!(all_nonnegative_integers(&[-0.0, 1.0]));
    }
}

mod batch_mask_tests {
    use ndarray::array;
    use polars::prelude::*;

    use crate::data_structs::{
        AnnotatedData,
        CountMatrix,
    };
    use crate::error::ConfigurationError;
    use crate::preprocessing::batch_mask_cell_measurement;

    fn example() -> AnnotatedData {
        let x = CountMatrix::dense(array![[1.0], [1.0], [1.0], [1.0]]);
        let obs = df!("batch" => ["A", "A", "B", "B"]).unwrap();
        let mut adata = AnnotatedData::new(x, obs).unwrap();
        adata
            .add_cell_measurement(
                "protein_expression",
                array![[1.0, 0.0], [0.0, 0.0], [0.0, 0.0], [0.0, 3.0]],
            )
            .unwrap();
        adata
    }

    #[test]
    fn test_masks_per_batch() {
        let masks =
            batch_mask_cell_measurement(&example(), "protein_expression", "batch").unwrap();
        assert_eq!(masks.len(), 2);
        assert_eq!(masks[0].label, "A");
        assert_eq!(masks[0].mask, array![true, false]);
        assert_eq!(masks[1].label, "B");
        assert_eq!(masks[1].mask, array![false, true]);
    }

    #[test]
    fn test_masks_follow_first_seen_order() {
        let x = CountMatrix::dense(array![[1.0], [1.0], [1.0]]);
        let obs = df!("batch" => ["z", "a", "z"]).unwrap();
        let mut adata = AnnotatedData::new(x, obs).unwrap();
        adata
            .add_cell_measurement("m", array![[0.0], [2.0], [0.0]])
            .unwrap();

        let masks = batch_mask_cell_measurement(&adata, "m", "batch").unwrap();
        assert_eq!(masks[0].label, "z");
        assert_eq!(masks[0].mask, array![false]);
        assert_eq!(masks[1].label, "a");
        assert_eq!(masks[1].mask, array![true]);
    }

    #[test]
    fn test_unknown_measurement() {
        let err = batch_mask_cell_measurement(&example(), "rna", "batch").unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigurationError>(),
            Some(&ConfigurationError::InvalidMeasurementKey("rna".into()))
        );
    }

    #[test]
    fn test_unknown_batch_key() {
        let err = batch_mask_cell_measurement(&example(), "protein_expression", "donor")
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigurationError>(),
            Some(&ConfigurationError::InvalidBatchKey("donor".into()))
        );
    }
}

mod filter_tests {
    use ndarray::array;
    use polars::prelude::*;

    use crate::data_structs::{
        AnnotatedData,
        CountMatrix,
    };
    use crate::preprocessing::{
        compute_library_size,
        filter_cells_by_count,
    };

    #[test]
    fn test_filter_removes_empty_cells() {
        let x = CountMatrix::dense(array![[3.0, 0.0], [0.0, 0.0], [1.0, 6.0]]);
        let obs = df!("batch" => ["a", "b", "c"]).unwrap();
        let mut adata = AnnotatedData::new(x, obs).unwrap();
        adata
            .add_cell_measurement("m", array![[1.0], [2.0], [3.0]])
            .unwrap();

        let filtered = filter_cells_by_count(&adata, 1.0).unwrap();
        assert_eq!(filtered.n_obs(), 2);
        assert_eq!(filtered.obs().height(), 2);
        assert_eq!(filtered.cell_measurement("m").unwrap(), &array![[1.0], [3.0]]);
        assert!(!compute_library_size(filtered.x()).has_empty_rows());
        // input is untouched
        assert_eq!(adata.n_obs(), 3);
    }

    #[test]
    fn test_filter_threshold() {
        let x = CountMatrix::dense(array![[3.0], [5.0], [10.0]]);
        let adata = AnnotatedData::from_matrix(x).unwrap();
        let filtered = filter_cells_by_count(&adata, 5.0).unwrap();
        assert_eq!(filtered.x().to_dense(), array![[5.0], [10.0]]);
    }
}

mod warning_tests {
    use std::sync::{
        Mutex,
        Once,
    };
    use std::thread::{
        self,
        ThreadId,
    };

    use log::{
        Level,
        LevelFilter,
        Log,
        Metadata,
        Record,
    };
    use ndarray::array;
    use once_cell::sync::Lazy;
    use rstest::rstest;

    use crate::data_structs::CountMatrix;
    use crate::preprocessing::{
        compute_library_size,
        compute_library_size_with,
        EmptyRowPolicy,
        LibrarySize,
    };

    /// Records of every test thread; each test reads back its own.
    static RECORDS: Lazy<Mutex<Vec<(ThreadId, Level, String)>>> =
        Lazy::new(|| Mutex::new(Vec::new()));
    static INSTALL: Once = Once::new();
    static LOGGER: CaptureLogger = CaptureLogger;

    struct CaptureLogger;

    impl Log for CaptureLogger {
        fn enabled(
            &self,
            _metadata: &Metadata,
        ) -> bool {
            true
        }

        fn log(
            &self,
            record: &Record,
        ) {
            if let Ok(mut records) = RECORDS.lock() {
                records.push((
                    thread::current().id(),
                    record.level(),
                    record.args().to_string(),
                ));
            }
        }

        fn flush(&self) {}
    }

    fn warnings_of<F: FnOnce()>(action: F) -> Vec<String> {
        INSTALL.call_once(|| {
            log::set_logger(&LOGGER).unwrap();
            log::set_max_level(LevelFilter::Trace);
        });
        action();
        let id = thread::current().id();
        RECORDS
            .lock()
            .unwrap()
            .iter()
            .filter(|(thread, level, _)| *thread == id && *level == Level::Warn)
            .map(|(_, _, message)| message.clone())
            .collect()
    }

    #[rstest]
    #[case::exclude(EmptyRowPolicy::Exclude)]
    #[case::fill_zero(EmptyRowPolicy::FillZero)]
    fn test_empty_rows_warn_once(#[case] policy: EmptyRowPolicy) {
        let matrix = CountMatrix::dense(array![[3.0, 0.0], [0.0, 0.0], [0.0, 0.0], [1.0, 6.0]]);
        let warnings = warnings_of(|| {
            compute_library_size_with(&matrix, policy);
        });
        assert_eq!(warnings.len(), 1, "{:?}", warnings);
        assert!(warnings[0].contains("2 empty cells"), "{}", warnings[0]);
    }

    #[test]
    fn test_no_warning_without_empty_rows() {
        let matrix = CountMatrix::dense(array![[3.0, 0.0], [1.0, 6.0]]);
        let warnings = warnings_of(|| {
            compute_library_size(&matrix);
        });
        assert!(warnings.is_empty(), "{:?}", warnings);
    }

    #[test]
    fn test_nan_total_is_not_empty() {
        let mut stats = None;
        let warnings = warnings_of(|| {
            stats = Some(LibrarySize::from_totals(&[f64::NAN, 10.0], EmptyRowPolicy::Exclude));
        });
        let stats = stats.unwrap();

        assert!(stats.empty_rows.is_empty());
        assert!(stats.log_counts[0].is_nan());
        assert!(stats.mean().unwrap().is_nan());
        assert_eq!(warnings.len(), 1, "{:?}", warnings);
        assert!(warnings[0].contains("non-finite"), "{}", warnings[0]);
        assert!(!warnings[0].contains("empty cells"));
    }
}
