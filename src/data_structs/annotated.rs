use anyhow::Context as AnyhowContext;
use indexmap::IndexMap;
use itertools::Itertools;
use log::debug;
use ndarray::{
    Array2,
    Axis,
};
use polars::prelude::*;

use super::matrix::CountMatrix;
use crate::error::ConfigurationError;
use crate::getter_fn;

/// Name of the identifier column created by [`AnnotatedData::from_matrix`].
pub const CELL_ID_COLUMN: &str = "cell_id";

/// In-memory annotated count matrix.
///
/// Holds the primary matrix `x`, a row-annotation table `obs` (one row per
/// cell), feature names and two name-keyed collections of matrices that share
/// the row dimension: alternate `layers` and dense `cell_measurements`.
/// Row counts of every component are checked whenever one is added.
#[derive(Debug, Clone)]
pub struct AnnotatedData {
    x:                 CountMatrix,
    obs:               DataFrame,
    var_names:         Vec<String>,
    layers:            IndexMap<String, CountMatrix>,
    cell_measurements: IndexMap<String, Array2<f64>>,
}

fn check_rows(
    what: &str,
    expected: usize,
    actual: usize,
) -> Result<(), ConfigurationError> {
    if expected != actual {
        return Err(ConfigurationError::ShapeMismatch {
            what: what.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

impl AnnotatedData {
    /// Creates a dataset from a matrix and its row annotations.
    pub fn new(
        x: CountMatrix,
        obs: DataFrame,
    ) -> anyhow::Result<Self> {
        check_rows("obs", x.n_rows(), obs.height())?;
        let var_names = (0..x.n_cols())
            .map(|i| format!("feature_{}", i))
            .collect_vec();
        Ok(Self {
            x,
            obs,
            var_names,
            layers: IndexMap::new(),
            cell_measurements: IndexMap::new(),
        })
    }

    /// Creates a dataset whose row annotations only hold a
    /// [`CELL_ID_COLUMN`] with values `cell_0..n`.
    pub fn from_matrix(x: CountMatrix) -> anyhow::Result<Self> {
        let ids = (0..x.n_rows())
            .map(|i| format!("cell_{}", i))
            .collect_vec();
        let obs = DataFrame::new(vec![Column::new(CELL_ID_COLUMN.into(), ids)])?;
        Self::new(x, obs)
    }

    pub fn with_var_names(
        mut self,
        var_names: Vec<String>,
    ) -> anyhow::Result<Self> {
        check_rows("var_names", self.x.n_cols(), var_names.len())?;
        self.var_names = var_names;
        Ok(self)
    }

    getter_fn!(x, CountMatrix);
    getter_fn!(obs, DataFrame);
    getter_fn!(var_names, Vec<String>);
    getter_fn!(layers, IndexMap<String, CountMatrix>);
    getter_fn!(cell_measurements, IndexMap<String, Array2<f64>>);

    pub fn n_obs(&self) -> usize {
        self.x.n_rows()
    }

    pub fn n_vars(&self) -> usize {
        self.x.n_cols()
    }

    pub fn obs_keys(&self) -> Vec<String> {
        self.obs
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn has_obs_key(
        &self,
        key: &str,
    ) -> bool {
        self.obs.get_column_index(key).is_some()
    }

    pub fn layer(
        &self,
        key: &str,
    ) -> Option<&CountMatrix> {
        self.layers.get(key)
    }

    pub fn cell_measurement(
        &self,
        key: &str,
    ) -> Option<&Array2<f64>> {
        self.cell_measurements.get(key)
    }

    /// Registers an alternate matrix. Replaces an existing layer of the same
    /// name.
    pub fn add_layer(
        &mut self,
        key: &str,
        matrix: CountMatrix,
    ) -> anyhow::Result<()> {
        check_rows(&format!("layer '{}'", key), self.n_obs(), matrix.n_rows())?;
        self.layers.insert(key.to_string(), matrix);
        Ok(())
    }

    /// Registers a named per-cell measurement table.
    pub fn add_cell_measurement(
        &mut self,
        key: &str,
        values: Array2<f64>,
    ) -> anyhow::Result<()> {
        check_rows(
            &format!("cell measurement '{}'", key),
            self.n_obs(),
            values.nrows(),
        )?;
        self.cell_measurements.insert(key.to_string(), values);
        Ok(())
    }

    /// Writes a `Float32` row-annotation column, replacing a column of the
    /// same name.
    pub fn set_obs_f32(
        &mut self,
        key: &str,
        values: Vec<f32>,
    ) -> anyhow::Result<()> {
        check_rows(&format!("obs column '{}'", key), self.n_obs(), values.len())?;
        self.obs.with_column(Column::new(key.into(), values))?;
        Ok(())
    }

    /// Reads a row-annotation column as `f32` values.
    pub fn obs_f32(
        &self,
        key: &str,
    ) -> anyhow::Result<Vec<f32>> {
        let column = self
            .obs
            .column(key)
            .with_context(|| format!("No obs column '{}'", key))?
            .as_materialized_series()
            .cast(&DataType::Float32)?;
        column
            .f32()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                value.ok_or_else(|| anyhow::anyhow!("Null in '{}' at row {}", key, row))
            })
            .collect()
    }

    /// New dataset made of the given rows of every component, in order.
    pub fn select_rows(
        &self,
        rows: &[usize],
    ) -> anyhow::Result<Self> {
        if let Some(&row) = rows.iter().find(|&&row| row >= self.n_obs()) {
            anyhow::bail!("Row {} out of bounds for {} rows", row, self.n_obs());
        }
        let idx = IdxCa::from_vec(
            "idx".into(),
            rows.iter().map(|&row| row as IdxSize).collect_vec(),
        );
        let obs = self.obs.take(&idx)?;
        let layers = self
            .layers
            .iter()
            .map(|(key, layer)| Ok((key.clone(), layer.select_rows(rows)?)))
            .collect::<anyhow::Result<IndexMap<_, _>>>()?;
        let cell_measurements = self
            .cell_measurements
            .iter()
            .map(|(key, values)| (key.clone(), values.select(Axis(0), rows)))
            .collect();
        debug!("Selected {} of {} rows", rows.len(), self.n_obs());

        Ok(Self {
            x: self.x.select_rows(rows)?,
            obs,
            var_names: self.var_names.clone(),
            layers,
            cell_measurements,
        })
    }
}
