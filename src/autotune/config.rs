use log::trace;
use serde::{
    Deserialize,
    Serialize,
};
use serde_json::{
    Map,
    Value,
};

use crate::with_field_fn;

/// Configuration map. Values are whatever the backend understands, e.g. a
/// fixed number or a search-space description.
pub type ParamMap = Map<String, Value>;

/// Hyperparameters grouped by the component that consumes them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HyperparamSpace {
    /// Passed to the model constructor.
    #[serde(default)]
    pub model:   ParamMap,
    /// Passed to the trainer.
    #[serde(default)]
    pub trainer: ParamMap,
    /// Passed to the training plan.
    #[serde(default)]
    pub plan:    ParamMap,
}

/// One sampled configuration, split back into its groups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitConfig {
    pub model:   ParamMap,
    pub trainer: ParamMap,
    pub plan:    ParamMap,
}

impl HyperparamSpace {
    pub fn new() -> Self {
        Self::default()
    }

    with_field_fn!(model, ParamMap);
    with_field_fn!(trainer, ParamMap);
    with_field_fn!(plan, ParamMap);

    /// Single map handed to the backend. On duplicate keys the trainer group
    /// overrides the model group and the plan group overrides both.
    pub fn merged(&self) -> ParamMap {
        let mut config = ParamMap::new();
        for group in [&self.model, &self.trainer, &self.plan] {
            config.extend(group.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        config
    }

    /// Routes every key of `config` to the first group declaring it (model,
    /// then trainer, then plan). Keys declared nowhere are dropped.
    pub fn split(
        &self,
        config: &ParamMap,
    ) -> SplitConfig {
        let mut split = SplitConfig::default();
        for (key, value) in config {
            let target = if self.model.contains_key(key) {
                &mut split.model
            }
            else if self.trainer.contains_key(key) {
                &mut split.trainer
            }
            else if self.plan.contains_key(key) {
                &mut split.plan
            }
            else {
                trace!("Dropping '{}': not part of any hyperparameter group", key);
                continue;
            };
            target.insert(key.clone(), value.clone());
        }
        split
    }
}

/// Direction of the objective metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Min,
    Max,
}

impl Mode {
    /// Whether `candidate` beats `best`.
    pub fn is_better(
        &self,
        candidate: f64,
        best: f64,
    ) -> bool {
        match self {
            Mode::Min => candidate < best,
            Mode::Max => candidate > best,
        }
    }
}

/// Experiment options forwarded to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSettings {
    /// Metric to optimize, a training metric or a metric function name.
    pub metric:      String,
    #[serde(default)]
    pub mode:        Mode,
    pub name:        String,
    /// Number of configurations sampled from the space.
    pub num_samples: usize,
}

impl RunSettings {
    pub fn new(metric: &str) -> Self {
        Self {
            metric:      metric.to_string(),
            mode:        Mode::default(),
            name:        "scvi-experiment".to_string(),
            num_samples: 10,
        }
    }

    with_field_fn!(metric, String);
    with_field_fn!(mode, Mode);
    with_field_fn!(name, String);
    with_field_fn!(num_samples, usize);
}
