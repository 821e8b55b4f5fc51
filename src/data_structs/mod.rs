//! Core data structures for cell-by-feature count data.
//!
//! - [`CountMatrix`]: dense (`ndarray`) or compressed-row sparse (`sprs`)
//!   matrix, rows are cells.
//! - [`AnnotatedData`]: a primary [`CountMatrix`] with a `polars` row
//!   annotation table, alternate layers and named cell measurements.
//! - [`BatchAssignment`]: the batch label of every row, read from a row
//!   annotation column.

mod annotated;
mod batch;
mod matrix;


pub use annotated::{
    AnnotatedData,
    CELL_ID_COLUMN,
};
pub use batch::BatchAssignment;
pub use matrix::CountMatrix;
