pub use crate::data_structs::{
    AnnotatedData,
    BatchAssignment,
    CountMatrix,
    CELL_ID_COLUMN,
};
pub use crate::error::ConfigurationError;
pub use crate::preprocessing::{
    all_nonnegative_integers,
    batch_mask_cell_measurement,
    batch_masks,
    check_nonnegative_integers,
    compute_library_size,
    compute_library_size_batch,
    compute_library_size_with,
    filter_cells_by_count,
    BatchMask,
    EmptyRowPolicy,
    LibrarySize,
    LibrarySizeConfig,
    DEFAULT_LOCAL_L_MEAN_KEY,
    DEFAULT_LOCAL_L_VAR_KEY,
};
