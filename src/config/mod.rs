// src/config/mod.rs ~=#######D]======A===r===c====M===o===o===n=====<Lord[CONFIG]Xyn>=====S===t===u===d===i===o===s======[R|$>

use crate::aproar::ntm::ControllerType;
use crate::constants::*;
use crate::omnixtracker::omnixerror::{NTMError, OmniXError};
use crate::problems::ProblemKind;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Reports a failed section check as `OmniXError::ValidationError`.
pub fn validate_section(section: &str, check: Result<(), NTMError>) -> Result<(), OmniXError> {
    check.map_err(|e| OmniXError::ValidationError(format!("{} config: {}", section, e)))
}

/// Explicit run-wide context handed to every constructor that needs one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppContext {
    pub seed: u64,
    pub visualize: bool,
}

impl Default for AppContext {
    fn default() -> Self {
        Self {
            seed: *DEFAULT_SEED,
            visualize: *VISUALIZE,
        }
    }
}

impl AppContext {
    pub fn with_seed(seed: u64) -> Self {
        Self { seed, visualize: false }
    }

    /// Derives an independent seed for a named component so that the model
    /// and the problem generator never share a random stream.
    pub fn component_seed(&self, component: &str) -> u64 {
        component
            .bytes()
            .fold(self.seed ^ 0x9E37_79B9_7F4A_7C15, |acc, b| acc.rotate_left(5) ^ b as u64)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NTMConfig {
    pub input_size: usize,
    pub output_size: usize,
    pub state_units: usize,
    pub num_heads: usize,
    pub num_shift: usize,
    pub memory_addresses: usize,
    pub memory_content_size: usize,
    pub is_cam: bool,
    pub controller: ControllerType,
}

impl Default for NTMConfig {
    fn default() -> Self {
        Self {
            input_size: PROBLEM_CONTROL_BITS + PROBLEM_DATA_BITS,
            output_size: PROBLEM_DATA_BITS,
            state_units: NTM_STATE_UNITS,
            num_heads: NTM_NUM_HEADS,
            num_shift: NTM_NUM_SHIFT,
            memory_addresses: NTM_MEMORY_ADDRESSES,
            memory_content_size: NTM_MEMORY_CONTENT_SIZE,
            is_cam: NTM_IS_CAM,
            controller: ControllerType::FeedForward,
        }
    }
}

impl NTMConfig {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            input_size: env_or("NTM_INPUT_SIZE", default.input_size),
            output_size: env_or("NTM_OUTPUT_SIZE", default.output_size),
            state_units: env_or("NTM_STATE_UNITS", default.state_units),
            num_heads: env_or("NTM_NUM_HEADS", default.num_heads),
            num_shift: env_or("NTM_NUM_SHIFT", default.num_shift),
            memory_addresses: env_or("NTM_MEMORY_ADDRESSES", default.memory_addresses),
            memory_content_size: env_or("NTM_MEMORY_CONTENT_SIZE", default.memory_content_size),
            is_cam: env_or("NTM_IS_CAM", default.is_cam),
            controller: env_or("NTM_CONTROLLER", default.controller),
        }
    }

    pub fn validate(&self) -> Result<(), NTMError> {
        let sizes = [
            ("input_size", self.input_size),
            ("output_size", self.output_size),
            ("state_units", self.state_units),
            ("num_heads", self.num_heads),
            ("num_shift", self.num_shift),
            ("memory_addresses", self.memory_addresses),
            ("memory_content_size", self.memory_content_size),
        ];
        if let Some((name, _)) = sizes.iter().find(|(_, v)| *v == 0) {
            return Err(NTMError::InvalidArgument(format!("{} must be positive", name)));
        }
        if self.num_shift % 2 == 0 {
            return Err(NTMError::InvalidArgument(format!(
                "num_shift must be odd (currently {})",
                self.num_shift
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProblemConfig {
    pub kind: ProblemKind,
    pub batch_size: usize,
    pub control_bits: usize,
    pub data_bits: usize,
    pub min_sequence_length: usize,
    pub max_sequence_length: usize,
    pub bias: f64,
    pub randomize_control_lines: bool,
}

impl Default for ProblemConfig {
    fn default() -> Self {
        Self {
            kind: ProblemKind::DualSerialReverseRecall,
            batch_size: PROBLEM_BATCH_SIZE,
            control_bits: PROBLEM_CONTROL_BITS,
            data_bits: PROBLEM_DATA_BITS,
            min_sequence_length: PROBLEM_MIN_SEQUENCE_LENGTH,
            max_sequence_length: PROBLEM_MAX_SEQUENCE_LENGTH,
            bias: PROBLEM_BIAS,
            randomize_control_lines: false,
        }
    }
}

impl ProblemConfig {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            kind: env_or("PROBLEM_KIND", default.kind),
            batch_size: env_or("PROBLEM_BATCH_SIZE", default.batch_size),
            control_bits: env_or("PROBLEM_CONTROL_BITS", default.control_bits),
            data_bits: env_or("PROBLEM_DATA_BITS", default.data_bits),
            min_sequence_length: env_or("PROBLEM_MIN_SEQUENCE_LENGTH", default.min_sequence_length),
            max_sequence_length: env_or("PROBLEM_MAX_SEQUENCE_LENGTH", default.max_sequence_length),
            bias: env_or("PROBLEM_BIAS", default.bias),
            randomize_control_lines: env_or("PROBLEM_RANDOMIZE_CONTROL_LINES", default.randomize_control_lines),
        }
    }

    /// Checks the parts every algorithmic problem shares; bit minimums are
    /// checked by each problem's constructor.
    pub fn validate(&self) -> Result<(), NTMError> {
        if self.batch_size == 0 {
            return Err(NTMError::InvalidArgument("batch_size must be positive".to_string()));
        }
        if self.min_sequence_length == 0 {
            return Err(NTMError::InvalidArgument("min_sequence_length must be positive".to_string()));
        }
        if self.min_sequence_length > self.max_sequence_length {
            return Err(NTMError::InvalidArgument(format!(
                "min_sequence_length ({}) exceeds max_sequence_length ({})",
                self.min_sequence_length, self.max_sequence_length
            )));
        }
        if !(0.0..=1.0).contains(&self.bias) {
            return Err(NTMError::InvalidArgument(format!("bias must lie in [0, 1] (currently {})", self.bias)));
        }
        Ok(())
    }

    /// Input width fed to a model: control bits followed by data bits.
    pub fn input_size(&self) -> usize {
        self.control_bits + self.data_bits
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurriculumConfig {
    pub initial_max_length: usize,
    pub interval: usize,
    pub step: usize,
}

impl Default for CurriculumConfig {
    fn default() -> Self {
        Self {
            initial_max_length: CURRICULUM_INITIAL_MAX_LENGTH,
            interval: CURRICULUM_INTERVAL,
            step: CURRICULUM_STEP,
        }
    }
}

impl CurriculumConfig {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            initial_max_length: env_or("CURRICULUM_INITIAL_MAX_LENGTH", default.initial_max_length),
            interval: env_or("CURRICULUM_INTERVAL", default.interval),
            step: env_or("CURRICULUM_STEP", default.step),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VqaConfig {
    pub image_encoding_channels: usize,
    pub encoded_question_size: usize,
    pub word_embedded_size: usize,
    pub use_question_encoding: bool,
    pub question_lstm_layers: usize,
    pub key_query_size: usize,
    pub num_attention_layers: usize,
    pub classifier_mid_features: usize,
    pub num_classes: usize,
}

impl Default for VqaConfig {
    fn default() -> Self {
        Self {
            image_encoding_channels: VQA_IMAGE_ENCODING_CHANNELS,
            encoded_question_size: VQA_ENCODED_QUESTION_SIZE,
            word_embedded_size: VQA_WORD_EMBEDDED_SIZE,
            use_question_encoding: false,
            question_lstm_layers: VQA_QUESTION_LSTM_LAYERS,
            key_query_size: VQA_KEY_QUERY_SIZE,
            num_attention_layers: VQA_NUM_ATTENTION_LAYERS,
            classifier_mid_features: VQA_CLASSIFIER_MID_FEATURES,
            num_classes: VQA_NUM_CLASSES,
        }
    }
}

impl VqaConfig {
    pub fn validate(&self) -> Result<(), NTMError> {
        let sizes = [
            ("image_encoding_channels", self.image_encoding_channels),
            ("encoded_question_size", self.encoded_question_size),
            ("word_embedded_size", self.word_embedded_size),
            ("question_lstm_layers", self.question_lstm_layers),
            ("key_query_size", self.key_query_size),
            ("num_attention_layers", self.num_attention_layers),
            ("classifier_mid_features", self.classifier_mid_features),
            ("num_classes", self.num_classes),
        ];
        match sizes.iter().find(|(_, v)| *v == 0) {
            Some((name, _)) => Err(NTMError::InvalidArgument(format!("{} must be positive", name))),
            None => Ok(()),
        }
    }
}
