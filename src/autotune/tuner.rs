use indexmap::IndexMap;
use itertools::Itertools;
use log::info;
use serde_json::Value;

use super::backend::{
    ProgressReporter,
    TuneAnalysis,
    TuneBackend,
    TuneSession,
};
use super::callbacks::{
    MetricFunction,
    MetricSelection,
    ModelSave,
    ReportMetrics,
    TrainerCallback,
};
use super::config::{
    HyperparamSpace,
    ParamMap,
    RunSettings,
};
use super::model::{
    TrainSettings,
    TrainableModel,
};
use crate::data_structs::AnnotatedData;

/// Hyperparameter tuning of a [`TrainableModel`] on one dataset.
pub struct Autotune<'a, M: TrainableModel> {
    adata:            &'a AnnotatedData,
    training_metrics: Vec<String>,
    metric_functions: IndexMap<String, MetricFunction<M>>,
    space:            HyperparamSpace,
    num_epochs:       usize,
    reporter:         ProgressReporter,
}

impl<'a, M: TrainableModel> Autotune<'a, M> {
    pub fn new(
        adata: &'a AnnotatedData,
        space: HyperparamSpace,
    ) -> Self {
        let training_metrics = vec!["elbo_validation".to_string()];
        Self {
            adata,
            reporter: ProgressReporter::new(training_metrics.clone()),
            training_metrics,
            metric_functions: IndexMap::new(),
            space,
            num_epochs: 2,
        }
    }

    /// Trainer metrics reported after every validation epoch. An empty list
    /// reports every logged metric.
    pub fn with_training_metrics(
        mut self,
        metrics: Vec<String>,
    ) -> Self {
        self.training_metrics = metrics;
        self.refresh_reporter();
        self
    }

    /// Adds a metric computed from the model after every validation epoch.
    pub fn with_metric_function<F>(
        mut self,
        name: &str,
        function: F,
    ) -> Self
    where
        F: Fn(&M) -> f64 + Send + Sync + 'static, {
        self.metric_functions
            .insert(name.to_string(), Box::new(function));
        self.refresh_reporter();
        self
    }

    pub fn with_num_epochs(
        mut self,
        num_epochs: usize,
    ) -> Self {
        self.num_epochs = num_epochs;
        self
    }

    fn refresh_reporter(&mut self) {
        let columns = self
            .training_metrics
            .iter()
            .chain(self.metric_functions.keys())
            .cloned()
            .collect_vec();
        self.reporter = ProgressReporter::new(columns);
    }

    /// Configuration handed to the backend.
    pub fn config(&self) -> ParamMap {
        self.space.merged()
    }

    pub fn reporter(&self) -> &ProgressReporter {
        &self.reporter
    }

    /// Runs one trial: builds a model from the model group of `config` and
    /// trains it with checkpointing and metric reporting attached.
    pub fn train_trial(
        &self,
        config: &ParamMap,
        session: &dyn TuneSession,
    ) -> anyhow::Result<()> {
        let split = self.space.split(config);
        let mut model = M::build(self.adata, &split.model)?;

        let mut save = ModelSave::new(session);
        let mut report = ReportMetrics::new(
            MetricSelection::from(self.training_metrics.clone()),
            &self.metric_functions,
            session,
        );
        let mut callbacks: [&mut dyn TrainerCallback<M>; 2] = [&mut save, &mut report];

        let settings = TrainSettings {
            trainer:                 &split.trainer,
            plan:                    &split.plan,
            max_epochs:              self.num_epochs,
            check_val_every_n_epoch: 1,
        };
        model.train(&settings, &mut callbacks)
    }

    /// Runs the experiment on `backend` and returns the best model, loaded
    /// from the best trial's checkpoint, with the backend's analysis.
    pub fn run<B: TuneBackend>(
        &self,
        backend: &B,
        settings: &RunSettings,
    ) -> anyhow::Result<(M, TuneAnalysis)> {
        info!(
            "Starting experiment '{}': {} samples, {} {:?}",
            settings.name, settings.num_samples, settings.metric, settings.mode
        );
        let trainable = |config: &ParamMap, session: &dyn TuneSession| {
            self.train_trial(config, session)
        };
        let analysis = backend.run(&trainable, &self.config(), settings, &self.reporter)?;
        info!(
            "Best hyperparameters found were: {}",
            Value::Object(analysis.best_config.clone())
        );

        let split = self.space.split(&analysis.best_config);
        let mut best_model = M::build(self.adata, &split.model)?;
        best_model.load(self.adata, &analysis.best_checkpoint.join("checkpoint"))?;
        Ok((best_model, analysis))
    }
}
