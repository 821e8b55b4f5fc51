use itertools::Itertools;
use log::info;

use crate::data_structs::AnnotatedData;

/// Keeps the cells whose total count in the primary matrix is at least
/// `min_count`. Row order, layers and cell measurements follow the kept
/// rows.
pub fn filter_cells_by_count(
    adata: &AnnotatedData,
    min_count: f64,
) -> anyhow::Result<AnnotatedData> {
    let kept = adata
        .x()
        .row_sums()
        .iter()
        .positions(|&total| total >= min_count)
        .collect_vec();

    info!(
        "Filtering cells: kept {}, removed {} with total count below {}",
        kept.len(),
        adata.n_obs() - kept.len(),
        min_count
    );
    adata.select_rows(&kept)
}
