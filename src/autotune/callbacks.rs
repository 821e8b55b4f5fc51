//! Trainer callbacks connecting a training run to its tuning trial.

use indexmap::IndexMap;
use log::debug;

use super::backend::TuneSession;
use super::model::TrainableModel;

/// Trainer state visible to callbacks at the end of a validation epoch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainerState {
    pub current_epoch:        usize,
    pub global_step:          usize,
    /// Set while the trainer runs its initial validation sanity check.
    pub running_sanity_check: bool,
    /// Metrics logged by the trainer so far, by name.
    pub callback_metrics:     IndexMap<String, f64>,
}

impl TrainerState {
    /// Checkpoint name of the current position, `epoch={e}-step={s}`.
    pub fn checkpoint_step(&self) -> String {
        format!("epoch={}-step={}", self.current_epoch, self.global_step)
    }
}

/// Hook invoked by a [`TrainableModel`] after every validation epoch.
pub trait TrainerCallback<M> {
    fn on_validation_end(
        &mut self,
        state: &TrainerState,
        model: &M,
    ) -> anyhow::Result<()>;
}

/// Saves the model into a fresh checkpoint directory of the trial after
/// every validation epoch.
pub struct ModelSave<'s> {
    session: &'s dyn TuneSession,
}

impl<'s> ModelSave<'s> {
    pub fn new(session: &'s dyn TuneSession) -> Self {
        Self { session }
    }
}

impl<M: TrainableModel> TrainerCallback<M> for ModelSave<'_> {
    fn on_validation_end(
        &mut self,
        state: &TrainerState,
        model: &M,
    ) -> anyhow::Result<()> {
        if state.running_sanity_check {
            return Ok(());
        }
        let dir = self.session.checkpoint_dir(&state.checkpoint_step())?;
        let path = dir.join("checkpoint");
        debug!("Saving checkpoint to {}", path.display());
        model.save(&path)
    }
}

/// Which trainer metrics are reported.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricSelection {
    /// Every metric in the trainer state.
    All,
    /// These metrics, under their own names.
    Names(Vec<String>),
    /// Report name -> trainer metric name.
    Renamed(IndexMap<String, String>),
}

impl From<Vec<String>> for MetricSelection {
    fn from(value: Vec<String>) -> Self {
        if value.is_empty() {
            MetricSelection::All
        }
        else {
            MetricSelection::Names(value)
        }
    }
}

/// Metric computed from the trained model rather than logged by the trainer,
/// e.g. a silhouette score of the latent space.
pub type MetricFunction<M> = Box<dyn Fn(&M) -> f64 + Send + Sync>;

/// Reports trainer metrics and metric functions to the trial after every
/// validation epoch.
pub struct ReportMetrics<'a, M> {
    metrics:   MetricSelection,
    functions: &'a IndexMap<String, MetricFunction<M>>,
    session:   &'a dyn TuneSession,
}

impl<'a, M> ReportMetrics<'a, M> {
    pub fn new(
        metrics: MetricSelection,
        functions: &'a IndexMap<String, MetricFunction<M>>,
        session: &'a dyn TuneSession,
    ) -> Self {
        Self {
            metrics,
            functions,
            session,
        }
    }

    /// Metrics to report for the given state. Fails when a selected metric
    /// was not logged by the trainer.
    pub fn collect(
        &self,
        state: &TrainerState,
        model: &M,
    ) -> anyhow::Result<IndexMap<String, f64>> {
        let lookup = |metric: &str| {
            state
                .callback_metrics
                .get(metric)
                .copied()
                .ok_or_else(|| anyhow::anyhow!("Metric '{}' was not logged by the trainer", metric))
        };

        let mut report = match &self.metrics {
            MetricSelection::All => state.callback_metrics.clone(),
            MetricSelection::Names(names) => {
                names
                    .iter()
                    .map(|name| Ok((name.clone(), lookup(name)?)))
                    .collect::<anyhow::Result<IndexMap<_, _>>>()?
            },
            MetricSelection::Renamed(mapping) => {
                mapping
                    .iter()
                    .map(|(name, metric)| Ok((name.clone(), lookup(metric)?)))
                    .collect::<anyhow::Result<IndexMap<_, _>>>()?
            },
        };
        for (name, function) in self.functions {
            report.insert(name.clone(), function(model));
        }
        Ok(report)
    }
}

impl<M> TrainerCallback<M> for ReportMetrics<'_, M> {
    fn on_validation_end(
        &mut self,
        state: &TrainerState,
        model: &M,
    ) -> anyhow::Result<()> {
        if state.running_sanity_check {
            return Ok(());
        }
        let report = self.collect(state, model)?;
        self.session.report(report)
    }
}
