//! Teaching configuration

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid batch size: {0} (must be > 0)")]
    InvalidBatchSize(usize),

    #[error("Invalid step count: {0} (must be > 0)")]
    InvalidStepCount(usize),

    #[error("Invalid step size: {0} (must be > 0.0)")]
    InvalidStepSize(f32),

    #[error("Invalid momentum coefficient: {0} (must be in (0.0, 1.0))")]
    InvalidBeta(f32),

    #[error("Invalid label norm cap: {0} (must be > 0.0)")]
    InvalidLabelNorm(f32),

    #[error("Invalid optimizer: {0} (must be one of: adam, amsgrad)")]
    InvalidOptimizer(String),

    #[error("Invalid generator hidden width: {0} (must be > 0)")]
    InvalidHiddenWidth(usize),

    #[error("Invalid gradient clip value: {0} (must be > 0.0)")]
    InvalidGradClip(f32),
}

/// Inner-loop optimizer variant for synthetic example synthesis
///
/// The two variants deliberately differ beyond the vhat maximum: Adam applies
/// bias correction to both moments, AMSGrad weights the first moment by βᵗ
/// and skips correction. Each is faithful to its published update rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InnerOptim {
    /// Bias-corrected adaptive moments
    #[default]
    Adam,
    /// Running maximum of the second moment estimate
    Amsgrad,
}

impl FromStr for InnerOptim {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "adam" => Ok(Self::Adam),
            "amsgrad" => Ok(Self::Amsgrad),
            other => Err(ConfigError::InvalidOptimizer(other.to_string())),
        }
    }
}

/// Batch visit order for the candidate selector scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanOrder {
    /// Visit batches in dataset order (deterministic)
    #[default]
    InOrder,
    /// Visit batches in a random order; returned indices stay
    /// dataset-relative
    Shuffled,
}

/// Configuration for example selection and synthesis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeachingConfig {
    /// Selector chunk size
    pub batch_size: usize,
    /// Iterations of the synthetic-data inner loop
    pub data_steps: usize,
    /// Iterations of the synthetic-label inner loop
    pub label_steps: usize,
    /// Step size for data synthesis
    pub alpha: f32,
    /// Step size for label synthesis
    pub label_alpha: f32,
    /// First-moment coefficient
    pub beta1: f32,
    /// Second-moment coefficient
    pub beta2: f32,
    /// Inner-loop optimizer variant
    pub optim: InnerOptim,
    /// L2 cap on the synthetic label vector
    pub label_norm: f32,
    /// Whether `generate_example` also optimizes the label after the data
    pub optimize_label: bool,
    /// Selector batch visit order
    pub scan_order: ScanOrder,
}

impl Default for TeachingConfig {
    fn default() -> Self {
        Self {
            batch_size: 1,
            data_steps: 200,
            label_steps: 200,
            alpha: 0.02,
            label_alpha: 0.02,
            beta1: 0.8,
            beta2: 0.999,
            optim: InnerOptim::default(),
            label_norm: 1.0,
            optimize_label: false,
            scan_order: ScanOrder::default(),
        }
    }
}

impl TeachingConfig {
    /// Check all fields, failing closed on the first invalid one
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize(self.batch_size));
        }
        if self.data_steps == 0 {
            return Err(ConfigError::InvalidStepCount(self.data_steps));
        }
        if self.label_steps == 0 {
            return Err(ConfigError::InvalidStepCount(self.label_steps));
        }
        if self.alpha <= 0.0 {
            return Err(ConfigError::InvalidStepSize(self.alpha));
        }
        if self.label_alpha <= 0.0 {
            return Err(ConfigError::InvalidStepSize(self.label_alpha));
        }
        for beta in [self.beta1, self.beta2] {
            if !(0.0..1.0).contains(&beta) || beta == 0.0 {
                return Err(ConfigError::InvalidBeta(beta));
            }
        }
        if self.label_norm <= 0.0 {
            return Err(ConfigError::InvalidLabelNorm(self.label_norm));
        }
        Ok(())
    }
}

/// Configuration for the unrolled generator training loop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnrolledConfig {
    /// Generator hidden layer width
    pub hidden: usize,
    /// Outer Adam learning rate
    pub lr: f32,
    /// Outer Adam first-moment coefficient
    pub beta1: f32,
    /// Outer Adam second-moment coefficient
    pub beta2: f32,
    /// Global-norm cap on generator gradients
    pub grad_clip: f32,
    /// Per-element clamp on generator gradients, applied before the norm cap
    pub value_clip: f32,
}

impl Default for UnrolledConfig {
    fn default() -> Self {
        Self {
            hidden: 128,
            lr: 2e-4,
            beta1: 0.5,
            beta2: 0.999,
            grad_clip: 5.0,
            value_clip: 5.0,
        }
    }
}

impl UnrolledConfig {
    /// Check all fields, failing closed on the first invalid one
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hidden == 0 {
            return Err(ConfigError::InvalidHiddenWidth(self.hidden));
        }
        if self.lr <= 0.0 {
            return Err(ConfigError::InvalidStepSize(self.lr));
        }
        for beta in [self.beta1, self.beta2] {
            if !(0.0..1.0).contains(&beta) || beta == 0.0 {
                return Err(ConfigError::InvalidBeta(beta));
            }
        }
        if self.grad_clip <= 0.0 {
            return Err(ConfigError::InvalidGradClip(self.grad_clip));
        }
        if self.value_clip <= 0.0 {
            return Err(ConfigError::InvalidGradClip(self.value_clip));
        }
        Ok(())
    }
}
