use ndarray::{
    Array1,
    ArrayView2,
};

use crate::data_structs::{
    AnnotatedData,
    BatchAssignment,
};
use crate::error::ConfigurationError;

/// Columns of a cell measurement observed in one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchMask {
    pub label: String,
    /// `true` where at least one row of the batch is non-zero.
    pub mask:  Array1<bool>,
}

/// For every batch, in first-seen order, the mask of measurement columns
/// that hold a non-zero value in that batch.
///
/// Useful when a measurement is the union of columns measured in different
/// source datasets: a column that is all zero within a batch was most likely
/// not measured there.
pub fn batch_mask_cell_measurement(
    adata: &AnnotatedData,
    measurement: &str,
    batch_key: &str,
) -> anyhow::Result<Vec<BatchMask>> {
    let values = adata
        .cell_measurement(measurement)
        .ok_or_else(|| ConfigurationError::InvalidMeasurementKey(measurement.to_string()))?;
    let batches = BatchAssignment::from_obs(adata.obs(), batch_key)?;
    Ok(batch_masks(values.view(), &batches))
}

/// Masks over the columns of `values` per batch. Rows of `values` and
/// `batches` must line up.
pub fn batch_masks(
    values: ArrayView2<f64>,
    batches: &BatchAssignment,
) -> Vec<BatchMask> {
    batches
        .groups()
        .into_iter()
        .map(|(label, rows)| {
            let mut mask = Array1::from_elem(values.ncols(), false);
            for row in rows {
                mask.iter_mut()
                    .zip(values.row(row))
                    .for_each(|(present, &value)| *present |= value != 0.0);
            }
            BatchMask {
                label: label.to_string(),
                mask,
            }
        })
        .collect()
}
