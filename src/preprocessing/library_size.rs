use itertools::Itertools;
use log::{
    debug,
    info,
    warn,
};
use ndarray::{
    Array1,
    Array2,
};
use rayon::prelude::*;
use serde::{
    Deserialize,
    Serialize,
};

use crate::data_structs::{
    AnnotatedData,
    BatchAssignment,
    CountMatrix,
};
use crate::error::ConfigurationError;
use crate::utils::{
    mean_and_population_variance,
    THREAD_POOL,
};
use crate::with_field_fn;

/// Row-annotation column receiving the log library size mean.
pub const DEFAULT_LOCAL_L_MEAN_KEY: &str = "_scvi_local_l_mean";
/// Row-annotation column receiving the log library size variance.
pub const DEFAULT_LOCAL_L_VAR_KEY: &str = "_scvi_local_l_var";

/// How rows with a zero total count enter the mean and variance.
///
/// The log of such a row is undefined. In both modes its stored log value is
/// 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyRowPolicy {
    /// Leave empty rows out of the reduction.
    #[default]
    Exclude,
    /// Count empty rows as a log value of 0.
    FillZero,
}

/// Log library size statistics of one group of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct LibrarySize {
    /// `ln(total)` of every row, 0 for empty rows. NaN or infinite totals
    /// give a NaN or infinite log.
    pub log_counts: Array1<f32>,
    /// Mean of the log values, broadcast to a `(n_rows, 1)` column.
    pub local_mean: Array2<f32>,
    /// Population variance of the log values, broadcast to a `(n_rows, 1)`
    /// column.
    pub local_var:  Array2<f32>,
    /// Rows with a zero total count.
    pub empty_rows: Vec<usize>,
}

impl LibrarySize {
    /// Builds the statistics from precomputed row totals.
    pub fn from_totals(
        totals: &[f64],
        policy: EmptyRowPolicy,
    ) -> Self {
        // Non-finite totals are not empty: their log stays NaN or infinite.
        let logs = totals
            .iter()
            .map(|&total| {
                if total > 0.0 || !total.is_finite() {
                    Some(total.ln())
                }
                else {
                    None
                }
            })
            .collect_vec();
        let empty_rows = logs
            .iter()
            .positions(|value| value.is_none())
            .collect_vec();

        if !empty_rows.is_empty() {
            warn!(
                "This dataset has {} empty cells, this might fail inference. Data \
                 should be filtered with `filter_cells_by_count`",
                empty_rows.len()
            );
        }
        let non_finite = totals.iter().filter(|total| !total.is_finite()).count();
        if non_finite > 0 {
            warn!(
                "This dataset has {} cells with a non-finite total count, their log \
                 library size and the group statistics are not finite",
                non_finite
            );
        }

        let reduced = match policy {
            EmptyRowPolicy::Exclude => logs.iter().flatten().copied().collect_vec(),
            EmptyRowPolicy::FillZero => {
                logs.iter().map(|value| value.unwrap_or(0.0)).collect_vec()
            },
        };
        let (mean, var) = mean_and_population_variance(&reduced);

        let n_rows = totals.len();
        Self {
            log_counts: logs
                .iter()
                .map(|value| value.unwrap_or(0.0) as f32)
                .collect(),
            local_mean: Array2::from_elem((n_rows, 1), mean as f32),
            local_var: Array2::from_elem((n_rows, 1), var as f32),
            empty_rows,
        }
    }

    /// Mean shared by all rows, `None` for an empty group.
    pub fn mean(&self) -> Option<f32> {
        self.local_mean.iter().next().copied()
    }

    /// Variance shared by all rows, `None` for an empty group.
    pub fn var(&self) -> Option<f32> {
        self.local_var.iter().next().copied()
    }

    pub fn has_empty_rows(&self) -> bool {
        !self.empty_rows.is_empty()
    }
}

/// Log library size statistics over all rows of `data`, excluding empty rows
/// from the reduction.
pub fn compute_library_size(data: &CountMatrix) -> LibrarySize {
    compute_library_size_with(data, EmptyRowPolicy::default())
}

pub fn compute_library_size_with(
    data: &CountMatrix,
    policy: EmptyRowPolicy,
) -> LibrarySize {
    let totals = data.row_sums().to_vec();
    LibrarySize::from_totals(&totals, policy)
}

/// Options of [`compute_library_size_batch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibrarySizeConfig {
    /// Row-annotation column holding the batch labels.
    pub batch_key:        String,
    /// Output column for the mean, [`DEFAULT_LOCAL_L_MEAN_KEY`] if unset.
    #[serde(default)]
    pub local_l_mean_key: Option<String>,
    /// Output column for the variance, [`DEFAULT_LOCAL_L_VAR_KEY`] if unset.
    #[serde(default)]
    pub local_l_var_key:  Option<String>,
    /// Use this layer instead of the primary matrix.
    #[serde(default)]
    pub layer_key:        Option<String>,
    /// Return a modified copy instead of mutating the input.
    #[serde(default)]
    pub copy:             bool,
    #[serde(default)]
    pub empty_rows:       EmptyRowPolicy,
}

impl LibrarySizeConfig {
    pub fn new(batch_key: &str) -> Self {
        Self {
            batch_key:        batch_key.to_string(),
            local_l_mean_key: None,
            local_l_var_key:  None,
            layer_key:        None,
            copy:             false,
            empty_rows:       EmptyRowPolicy::default(),
        }
    }

    with_field_fn!(batch_key, String);
    with_field_fn!(local_l_mean_key, Option<String>);
    with_field_fn!(local_l_var_key, Option<String>);
    with_field_fn!(layer_key, Option<String>);
    with_field_fn!(copy, bool);
    with_field_fn!(empty_rows, EmptyRowPolicy);

    pub fn mean_key(&self) -> &str {
        self.local_l_mean_key
            .as_deref()
            .unwrap_or(DEFAULT_LOCAL_L_MEAN_KEY)
    }

    pub fn var_key(&self) -> &str {
        self.local_l_var_key
            .as_deref()
            .unwrap_or(DEFAULT_LOCAL_L_VAR_KEY)
    }
}

/// Computes log library size statistics independently for every batch and
/// writes each batch's mean and variance into all of its rows.
///
/// Returns `Some(copy)` when `config.copy` is set and leaves `adata`
/// untouched; otherwise writes into `adata` and returns `None`. Keys are
/// validated before anything is written.
pub fn compute_library_size_batch(
    adata: &mut AnnotatedData,
    config: &LibrarySizeConfig,
) -> anyhow::Result<Option<AnnotatedData>> {
    let batches = BatchAssignment::from_obs(adata.obs(), &config.batch_key)?;
    let data = match config.layer_key.as_deref() {
        Some(key) => {
            adata
                .layer(key)
                .ok_or_else(|| ConfigurationError::InvalidLayerKey(key.to_string()))?
        },
        None => adata.x(),
    };
    check_output_keys(config)?;

    let (local_means, local_vars) =
        batch_statistics(data, &batches, config.empty_rows);

    if config.copy {
        let mut copied = adata.clone();
        write_statistics(&mut copied, config, local_means, local_vars)?;
        Ok(Some(copied))
    }
    else {
        write_statistics(adata, config, local_means, local_vars)?;
        Ok(None)
    }
}

/// Output columns must differ from each other and from the batch column.
fn check_output_keys(config: &LibrarySizeConfig) -> Result<(), ConfigurationError> {
    let (mean_key, var_key) = (config.mean_key(), config.var_key());
    if mean_key == var_key || mean_key == config.batch_key {
        return Err(ConfigurationError::DuplicateKey(mean_key.to_string()));
    }
    if var_key == config.batch_key {
        return Err(ConfigurationError::DuplicateKey(var_key.to_string()));
    }
    Ok(())
}

/// Per-row batch mean and variance.
fn batch_statistics(
    data: &CountMatrix,
    batches: &BatchAssignment,
    policy: EmptyRowPolicy,
) -> (Vec<f32>, Vec<f32>) {
    let totals = data.row_sums();
    let groups = batches.groups().into_iter().collect_vec();
    info!(
        "Computing library size for {} rows in {} batches",
        batches.len(),
        groups.len()
    );

    let per_batch = THREAD_POOL.install(|| {
        groups
            .into_par_iter()
            .map(|(label, rows)| {
                let batch_totals = rows.iter().map(|&row| totals[row]).collect_vec();
                let stats = LibrarySize::from_totals(&batch_totals, policy);
                debug!(
                    "Batch '{}': {} rows, mean {:?}, var {:?}",
                    label,
                    rows.len(),
                    stats.mean(),
                    stats.var()
                );
                (rows, stats)
            })
            .collect::<Vec<_>>()
    });

    let mut local_means = vec![0f32; batches.len()];
    let mut local_vars = vec![0f32; batches.len()];
    for (rows, stats) in per_batch {
        let mean = stats.mean().unwrap_or(0.0);
        let var = stats.var().unwrap_or(0.0);
        for row in rows {
            local_means[row] = mean;
            local_vars[row] = var;
        }
    }
    (local_means, local_vars)
}

fn write_statistics(
    adata: &mut AnnotatedData,
    config: &LibrarySizeConfig,
    local_means: Vec<f32>,
    local_vars: Vec<f32>,
) -> anyhow::Result<()> {
    adata.set_obs_f32(config.mean_key(), local_means)?;
    adata.set_obs_f32(config.var_key(), local_vars)?;
    Ok(())
}
