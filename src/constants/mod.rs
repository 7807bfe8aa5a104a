// src/constants/mod.rs ~=#######D]======A===r===c====M===o===o===n=====<Lord[CONSTANTS]Xyn>=====S===t===u===d===i===o===s======[R|$>

use once_cell::sync::Lazy;
use std::env;
use tracing::Level;

// Custom Signature Line constant
pub const ARCMOON_SIGNATURE: &str = "~=#######D]======A===r===c====M===o===o===n=====<Lord[{}]Xyn>=====S===t===u===d===i===o===s======[R|$>";

pub const CRATE_VERSION: &str = env!("CARGO_PKG_VERSION");

// Numerical guards
pub const EPSILON: f32 = 1e-6;
pub const WEIGHT_SUM_TOLERANCE: f32 = 1e-4;

// OmniXMetry - log-related constants
pub const METRICS_HISTORY_LEN: usize = 100;
pub static INITIAL_LOG_LEVEL: Lazy<Level> = Lazy::new(|| env::var("INITIAL_LOG_LEVEL").map(|v| v.parse().unwrap_or(Level::INFO)).unwrap_or(Level::INFO));
pub static LOG_FILE_PATH: Lazy<String> = Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "ntmx.log".to_string()));

// Application context
pub static DEFAULT_SEED: Lazy<u64> = Lazy::new(|| env::var("NTM_SEED").ok().and_then(|v| v.parse().ok()).unwrap_or(42));
pub static VISUALIZE: Lazy<bool> = Lazy::new(|| env::var("NTM_VISUALIZE").ok().and_then(|v| v.parse().ok()).unwrap_or(false));

// APROAR - NTM architecture parameters
pub const NTM_STATE_UNITS: usize = 64; // Controller hidden state size
pub const NTM_NUM_HEADS: usize = 1; // Number of read/write heads
pub const NTM_NUM_SHIFT: usize = 3; // Shift kernel size, must be odd
pub const NTM_MEMORY_ADDRESSES: usize = 32; // Number of memory slots
pub const NTM_MEMORY_CONTENT_SIZE: usize = 10; // Width of each memory slot
pub const NTM_IS_CAM: bool = true; // Content addressing enabled

// PROBLEMS - algorithmic task defaults
pub const PROBLEM_BATCH_SIZE: usize = 2;
pub const PROBLEM_CONTROL_BITS: usize = 4;
pub const PROBLEM_DATA_BITS: usize = 8;
pub const PROBLEM_MIN_SEQUENCE_LENGTH: usize = 1;
pub const PROBLEM_MAX_SEQUENCE_LENGTH: usize = 10;
pub const PROBLEM_BIAS: f64 = 0.5; // Probability of a data bit being 1

// Task minimums
pub const SERIAL_RECALL_MIN_CONTROL_BITS: usize = 1;
pub const SERIAL_RECALL_MIN_DATA_BITS: usize = 2;
pub const DUAL_RECALL_MIN_CONTROL_BITS: usize = 4;
pub const DUAL_RECALL_MIN_DATA_BITS: usize = 1;

// Curriculum defaults
pub const CURRICULUM_INITIAL_MAX_LENGTH: usize = 3;
pub const CURRICULUM_INTERVAL: usize = 50; // Episodes between max length increments, 0 disables
pub const CURRICULUM_STEP: usize = 1;

// Episode runner
pub const DEFAULT_EPISODES: usize = 10;

// VQA - stacked attention defaults
pub const VQA_IMAGE_ENCODING_CHANNELS: usize = 128;
pub const VQA_ENCODED_QUESTION_SIZE: usize = 13;
pub const VQA_WORD_EMBEDDED_SIZE: usize = 7;
pub const VQA_KEY_QUERY_SIZE: usize = 64;
pub const VQA_NUM_ATTENTION_LAYERS: usize = 2;
pub const VQA_CLASSIFIER_MID_FEATURES: usize = 256;
pub const VQA_NUM_CLASSES: usize = 10;
pub const VQA_QUESTION_LSTM_LAYERS: usize = 3;
