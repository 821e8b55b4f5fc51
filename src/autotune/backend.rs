//! Interfaces of the external tuning framework.

use std::fmt::Write;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{
    Deserialize,
    Serialize,
};

use super::config::{
    ParamMap,
    RunSettings,
};

/// Per-trial handle provided by the backend.
pub trait TuneSession {
    /// Directory for the checkpoint named `step`, created by the backend.
    fn checkpoint_dir(
        &self,
        step: &str,
    ) -> anyhow::Result<PathBuf>;

    /// Reports intermediate results of the trial.
    fn report(
        &self,
        metrics: IndexMap<String, f64>,
    ) -> anyhow::Result<()>;
}

/// Function run by the backend once per sampled configuration.
pub type Trainable<'a> =
    dyn Fn(&ParamMap, &dyn TuneSession) -> anyhow::Result<()> + Sync + 'a;

/// Outcome of an experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuneAnalysis {
    /// Configuration of the best trial.
    pub best_config:     ParamMap,
    /// Last checkpoint directory of the best trial.
    pub best_checkpoint: PathBuf,
    /// Last report of the best trial.
    pub best_result:     IndexMap<String, f64>,
}

/// Search, scheduling and trial management.
///
/// Implementations own the search algorithm and the trial scheduler (e.g.
/// ASHA); this crate only supplies the trainable and the configuration.
pub trait TuneBackend {
    fn run(
        &self,
        trainable: &Trainable<'_>,
        config: &ParamMap,
        settings: &RunSettings,
        reporter: &ProgressReporter,
    ) -> anyhow::Result<TuneAnalysis>;
}

/// Columns shown in the backend's progress output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressReporter {
    metric_columns: Vec<String>,
}

impl ProgressReporter {
    pub fn new(metric_columns: Vec<String>) -> Self {
        Self { metric_columns }
    }

    pub fn metric_columns(&self) -> &[String] {
        &self.metric_columns
    }

    /// One status line, `trial | column=value ...`. Missing metrics are
    /// shown as `-`.
    pub fn render(
        &self,
        trial: &str,
        metrics: &IndexMap<String, f64>,
    ) -> String {
        let mut line = trial.to_string();
        for column in &self.metric_columns {
            let _ = match metrics.get(column) {
                Some(value) => write!(line, " | {}={:.4}", column, value),
                None => write!(line, " | {}=-", column),
            };
        }
        line
    }
}
