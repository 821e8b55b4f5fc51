//! Hyperparameter tuning glue.
//!
//! This module does not search or schedule anything itself. It connects
//! three external collaborators:
//!
//! - a [`TrainableModel`] (construction, training with callbacks, save and
//!   load),
//! - a [`TuneBackend`] that samples configurations, runs trials, schedules
//!   them and picks the best one,
//! - the [`TuneSession`] the backend hands to every trial for checkpoint
//!   directories and metric reports.
//!
//! [`Autotune`] keeps the hyperparameters split into model, trainer and
//! training-plan groups ([`HyperparamSpace`]), runs every trial with the
//! [`ModelSave`] and [`ReportMetrics`] callbacks attached, and reloads the
//! best model from its checkpoint.

mod backend;
mod callbacks;
mod config;
mod model;
mod tuner;


pub use backend::{
    ProgressReporter,
    Trainable,
    TuneAnalysis,
    TuneBackend,
    TuneSession,
};
pub use callbacks::{
    MetricFunction,
    MetricSelection,
    ModelSave,
    ReportMetrics,
    TrainerCallback,
    TrainerState,
};
pub use config::{
    HyperparamSpace,
    Mode,
    ParamMap,
    RunSettings,
    SplitConfig,
};
pub use model::{
    TrainSettings,
    TrainableModel,
};
pub use tuner::Autotune;
