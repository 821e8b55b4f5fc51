use std::path::Path;

use super::callbacks::TrainerCallback;
use super::config::ParamMap;
use crate::data_structs::AnnotatedData;

/// Trainer options of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainSettings<'a> {
    pub trainer:                 &'a ParamMap,
    pub plan:                    &'a ParamMap,
    pub max_epochs:              usize,
    pub check_val_every_n_epoch: usize,
}

/// Model trained by an external training framework.
pub trait TrainableModel: Sized {
    /// Builds an untrained model for `adata` from model hyperparameters.
    fn build(
        adata: &AnnotatedData,
        params: &ParamMap,
    ) -> anyhow::Result<Self>;

    /// Trains the model, invoking every callback at the end of each
    /// validation epoch.
    fn train(
        &mut self,
        settings: &TrainSettings<'_>,
        callbacks: &mut [&mut dyn TrainerCallback<Self>],
    ) -> anyhow::Result<()>;

    fn save(
        &self,
        path: &Path,
    ) -> anyhow::Result<()>;

    fn load(
        &mut self,
        adata: &AnnotatedData,
        dir_path: &Path,
    ) -> anyhow::Result<()>;
}
