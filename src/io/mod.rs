//! CSV input and output for count matrices and row annotations.
//!
//! Count files have a header row with feature names and one row per cell;
//! every field must be numeric. Row annotation files have a header row and
//! one row per cell, in the same order as the count file.

mod csv;

pub use csv::{
    read_counts_csv,
    read_dataset,
    read_obs_csv,
    write_counts_csv,
    write_obs_csv,
};
