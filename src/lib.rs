//! # scprep
//!
//! `scprep` computes the per-cell statistics a single-cell count model needs
//! before training, and wraps hyperparameter tuning of such models around an
//! external tuning backend.
//!
//! ## Key Features
//!
//! * **Library size statistics**: mean and variance of the log total count
//!   per cell, over the whole dataset ([`compute_library_size`]) or per batch
//!   ([`compute_library_size_batch`]), written into row annotations of an
//!   [`AnnotatedData`].
//! * **Count validation**: [`check_nonnegative_integers`] tells whether a
//!   dense or sparse matrix holds raw counts.
//! * **Batch masks**: [`batch_mask_cell_measurement`] finds which columns of
//!   a cell measurement were observed in every batch.
//! * **Tuning glue** (feature `tune`, on by default): [`autotune`] splits
//!   sampled configurations into model, trainer and training-plan groups,
//!   registers checkpoint and metric-report callbacks and reloads the best
//!   model. Search and scheduling stay with the backend.
//!
//! Number of threads to be used can be configured with setting
//! `SCPREP_NUM_THREADS` environment variable.
//!
//! ## Usage
//!
//! ```no_run
//! use ndarray::array;
//! use polars::prelude::*;
//! use scprep::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let x = CountMatrix::dense(array![[3.0, 1.0], [0.0, 5.0], [2.0, 2.0]]);
//!     let obs = df!("batch" => ["a", "a", "b"])?;
//!     let mut adata = AnnotatedData::new(x, obs)?;
//!
//!     assert!(check_nonnegative_integers(adata.x()));
//!     compute_library_size_batch(&mut adata, &LibrarySizeConfig::new("batch"))?;
//!     println!("{:?}", adata.obs_f32(DEFAULT_LOCAL_L_MEAN_KEY)?);
//!     Ok(())
//! }
//! ```

#[ctor::ctor]
fn init() {
    if let Ok(n) = std::env::var(utils::NUM_THREADS_ENV) {
        std::env::set_var("POLARS_MAX_THREADS", n)
    }
}

pub mod data_structs;
pub mod error;
pub mod exports;
pub mod io;
pub mod prelude;
pub mod preprocessing;
pub mod utils;

#[cfg(feature = "tune")]
pub mod autotune;

pub use crate::data_structs::{
    AnnotatedData,
    BatchAssignment,
    CountMatrix,
};
pub use crate::error::ConfigurationError;
pub use crate::preprocessing::{
    batch_mask_cell_measurement,
    check_nonnegative_integers,
    compute_library_size,
    compute_library_size_batch,
    filter_cells_by_count,
    EmptyRowPolicy,
    LibrarySize,
    LibrarySizeConfig,
};
