//! Per-cell preprocessing applied before model training.
//!
//! - [`compute_library_size`] and [`compute_library_size_batch`]: mean and
//!   variance of the log library size, globally or per batch, written into
//!   row annotations.
//! - [`check_nonnegative_integers`]: count-data predicate.
//! - [`batch_mask_cell_measurement`]: which measurement columns were
//!   observed in each batch.
//! - [`filter_cells_by_count`]: drops cells below a total count.

mod batch_mask;
mod filter;
mod library_size;
mod validation;

#[cfg(test)]
mod tests;

pub use batch_mask::{
    batch_mask_cell_measurement,
    batch_masks,
    BatchMask,
};
pub use filter::filter_cells_by_count;
pub use library_size::{
    compute_library_size,
    compute_library_size_batch,
    compute_library_size_with,
    EmptyRowPolicy,
    LibrarySize,
    LibrarySizeConfig,
    DEFAULT_LOCAL_L_MEAN_KEY,
    DEFAULT_LOCAL_L_VAR_KEY,
};
pub use validation::{
    all_nonnegative_integers,
    check_nonnegative_integers,
};
