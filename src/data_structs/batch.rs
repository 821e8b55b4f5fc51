use anyhow::Context as AnyhowContext;
use indexmap::IndexMap;
use log::trace;
use polars::prelude::*;

use crate::error::ConfigurationError;

/// Batch label of every row.
///
/// Rows sharing a label form one group; groups are disjoint and are
/// enumerated in the order their label is first seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchAssignment {
    labels: Vec<String>,
}

impl BatchAssignment {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    /// Every row in the same batch.
    pub fn uniform(
        n_rows: usize,
        label: &str,
    ) -> Self {
        Self {
            labels: vec![label.to_string(); n_rows],
        }
    }

    /// Reads labels from a row-annotation column. Any dtype is accepted and
    /// cast to string.
    pub fn from_obs(
        obs: &DataFrame,
        key: &str,
    ) -> anyhow::Result<Self> {
        if obs.get_column_index(key).is_none() {
            return Err(ConfigurationError::InvalidBatchKey(key.to_string()).into());
        }
        let column = obs.column(key)?;
        let as_str = column
            .as_materialized_series()
            .cast(&DataType::String)
            .with_context(|| format!("Could not read batch column '{}' as labels", key))?;

        let labels = as_str
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, label)| {
                label.map(str::to_string).ok_or_else(|| {
                    anyhow::Error::from(ConfigurationError::NullBatchLabel {
                        key: key.to_string(),
                        row,
                    })
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        trace!("Read {} batch labels from column '{}'", labels.len(), key);
        Ok(Self { labels })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Row indices of each batch, keyed by label in first-seen order.
    pub fn groups(&self) -> IndexMap<&str, Vec<usize>> {
        let mut groups: IndexMap<&str, Vec<usize>> = IndexMap::new();
        for (row, label) in self.labels.iter().enumerate() {
            groups.entry(label.as_str()).or_default().push(row);
        }
        groups
    }

    pub fn n_batches(&self) -> usize {
        self.groups().len()
    }
}
