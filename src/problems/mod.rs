// src/problems/mod.rs ~=#######D]======A===r===c====M===o===o===n=====<Lord[PROBLEMS]Xyn>=====S===t===u===d===i===o===s======[R|$>

pub mod curriculum;
pub mod dual_serial_reverse_recall;
pub mod reverse_recall;
pub mod serial_recall;

pub use curriculum::Curriculum;
pub use dual_serial_reverse_recall::DualSerialReverseRecall;
pub use reverse_recall::ReverseRecall;
pub use serial_recall::SerialRecall;

use crate::config::{AppContext, ProblemConfig};
use crate::omnixtracker::omnixerror::NTMError;
use ndarray::{s, Array1, Array2, Array3, Axis, Zip};
use ndarray_rand::rand_distr::Bernoulli;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use tracing::debug;

/// One generated batch.
#[derive(Debug, Clone, PartialEq)]
pub struct DataTuple {
    /// `[batch, time, control_bits + data_bits]`
    pub inputs: Array3<f32>,
    /// `[batch, time, data_bits]`
    pub targets: Array3<f32>,
    /// `[batch, time]`, true where the target is evaluated.
    pub mask: Array2<bool>,
    pub seq_length: usize,
}

impl DataTuple {
    pub fn batch_size(&self) -> usize {
        self.inputs.len_of(Axis(0))
    }

    pub fn time_steps(&self) -> usize {
        self.inputs.len_of(Axis(1))
    }
}

/// A source of synthetic algorithmic batches.
pub trait BatchGenerator {
    fn name(&self) -> &'static str;

    fn generate_batch(&mut self) -> DataTuple;

    /// Curriculum hook: later batches draw lengths up to `max_length`.
    fn set_max_length(&mut self, max_length: usize);

    fn min_length(&self) -> usize;

    fn max_length(&self) -> usize;

    fn input_size(&self) -> usize;

    fn output_size(&self) -> usize;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemKind {
    SerialRecall,
    ReverseRecall,
    DualSerialReverseRecall,
}

impl ProblemKind {
    pub fn build(self, config: &ProblemConfig, context: &AppContext) -> Result<Box<dyn BatchGenerator>, NTMError> {
        Ok(match self {
            ProblemKind::SerialRecall => Box::new(SerialRecall::new(config, context)?),
            ProblemKind::ReverseRecall => Box::new(ReverseRecall::new(config, context)?),
            ProblemKind::DualSerialReverseRecall => Box::new(DualSerialReverseRecall::new(config, context)?),
        })
    }
}

impl FromStr for ProblemKind {
    type Err = NTMError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "serial_recall" | "copy" => Ok(ProblemKind::SerialRecall),
            "reverse_recall" => Ok(ProblemKind::ReverseRecall),
            "dual_serial_reverse_recall" => Ok(ProblemKind::DualSerialReverseRecall),
            other => Err(NTMError::InvalidArgument(format!("unknown problem '{}'", other))),
        }
    }
}

impl fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProblemKind::SerialRecall => "serial_recall",
            ProblemKind::ReverseRecall => "reverse_recall",
            ProblemKind::DualSerialReverseRecall => "dual_serial_reverse_recall",
        };
        f.write_str(name)
    }
}

/// State shared by the recall problems: validated parameters and the seeded
/// random stream.
#[derive(Debug, Clone)]
pub struct SequenceSampler {
    config: ProblemConfig,
    /// Minimum length as configured, restored once the max allows it again.
    base_min_length: usize,
    bits: Bernoulli,
    rng: StdRng,
}

impl SequenceSampler {
    pub fn new(
        problem: &'static str,
        config: &ProblemConfig,
        context: &AppContext,
        min_control_bits: usize,
        min_data_bits: usize,
    ) -> Result<Self, NTMError> {
        if config.control_bits < min_control_bits {
            return Err(NTMError::InsufficientBits {
                problem,
                kind: "control",
                required: min_control_bits,
                actual: config.control_bits,
            });
        }
        if config.data_bits < min_data_bits {
            return Err(NTMError::InsufficientBits {
                problem,
                kind: "data",
                required: min_data_bits,
                actual: config.data_bits,
            });
        }
        config.validate()?;
        let bits = Bernoulli::new(config.bias).map_err(|e| NTMError::InvalidArgument(e.to_string()))?;

        Ok(Self {
            config: config.clone(),
            base_min_length: config.min_sequence_length,
            bits,
            rng: StdRng::seed_from_u64(context.component_seed(problem)),
        })
    }

    pub fn config(&self) -> &ProblemConfig {
        &self.config
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn draw_seq_length(&mut self) -> usize {
        let (min, max) = (self.config.min_sequence_length, self.config.max_sequence_length);
        let seq_length = self.rng.gen_range(min..=max);
        debug!(seq_length, min, max, "Drew sequence length");
        seq_length
    }

    /// Random bit patterns `[batch, seq_length, data_bits]`.
    pub fn generate_bit_sequence(&mut self, seq_length: usize) -> Array3<f32> {
        let shape = (self.config.batch_size, seq_length, self.config.data_bits);
        Array3::random_using(shape, self.bits, &mut self.rng).mapv(|bit: bool| if bit { 1.0 } else { 0.0 })
    }

    pub fn set_max_length(&mut self, max_length: usize) {
        let max_length = max_length.max(1);
        self.config.max_sequence_length = max_length;
        self.config.min_sequence_length = self.base_min_length.min(max_length);
    }

    pub fn empty_batch(&self, time_steps: usize) -> (Array3<f32>, Array3<f32>) {
        let b = self.config.batch_size;
        (
            Array3::zeros((b, time_steps, self.config.input_size())),
            Array3::zeros((b, time_steps, self.config.data_bits)),
        )
    }
}

/// One-hot control pattern with `bit` set.
pub fn marker(control_bits: usize, bit: usize) -> Array1<f32> {
    let mut m = Array1::zeros(control_bits);
    m[bit] = 1.0;
    m
}

/// Writes `pattern` into the control channels of every timestep in `steps`.
pub fn set_control(inputs: &mut Array3<f32>, steps: Range<usize>, pattern: &Array1<f32>) {
    let control_bits = pattern.len();
    for mut lane in inputs.slice_mut(s![.., steps, ..control_bits]).lanes_mut(Axis(2)) {
        lane.assign(pattern);
    }
}

/// Copies `bits` into the data channels starting at timestep `start`.
pub fn set_data(inputs: &mut Array3<f32>, start: usize, control_bits: usize, bits: &Array3<f32>) {
    let len = bits.len_of(Axis(1));
    inputs.slice_mut(s![.., start..start + len, control_bits..]).assign(bits);
}

/// Writes `bits` into the targets starting at timestep `start`.
pub fn set_target(targets: &mut Array3<f32>, start: usize, bits: &Array3<f32>) {
    let len = bits.len_of(Axis(1));
    targets.slice_mut(s![.., start..start + len, ..]).assign(bits);
}

/// Reverses a `[batch, time, bits]` sequence along time.
pub fn reverse_time(bits: &Array3<f32>) -> Array3<f32> {
    bits.slice(s![.., ..;-1, ..]).to_owned()
}

/// Mask that is true exactly on the given timestep spans.
pub fn mask_spans(batch_size: usize, time_steps: usize, spans: &[Range<usize>]) -> Array2<bool> {
    let mut mask = Array2::from_elem((batch_size, time_steps), false);
    for span in spans {
        mask.slice_mut(s![.., span.clone()]).fill(true);
    }
    mask
}

fn check_eval_shapes(logits: &Array3<f32>, targets: &Array3<f32>, mask: &Array2<bool>) -> Result<usize, NTMError> {
    if logits.dim() != targets.dim() {
        return Err(NTMError::shape(targets.shape(), logits.shape()));
    }
    let (b, t, _) = targets.dim();
    if mask.dim() != (b, t) {
        return Err(NTMError::shape(&[b, t], mask.shape()));
    }
    let selected = mask.iter().filter(|&&m| m).count();
    if selected == 0 {
        return Err(NTMError::InvalidArgument("mask selects no timesteps".to_string()));
    }
    Ok(selected * targets.len_of(Axis(2)))
}

/// Mean binary cross-entropy over the masked timesteps, computed from logits.
pub fn masked_bce_with_logits(logits: &Array3<f32>, targets: &Array3<f32>, mask: &Array2<bool>) -> Result<f32, NTMError> {
    let count = check_eval_shapes(logits, targets, mask)?;
    let mut total = 0.0f64;
    Zip::from(logits.lanes(Axis(2)))
        .and(targets.lanes(Axis(2)))
        .and(mask)
        .for_each(|x, y, &m| {
            if m {
                for (&x, &y) in x.iter().zip(y.iter()) {
                    // max(x, 0) - x*y + ln(1 + e^-|x|)
                    total += (x.max(0.0) - x * y + (-x.abs()).exp().ln_1p()) as f64;
                }
            }
        });
    Ok((total / count as f64) as f32)
}

/// Fraction of masked bits where the sign of the logit matches the target.
pub fn masked_bit_accuracy(logits: &Array3<f32>, targets: &Array3<f32>, mask: &Array2<bool>) -> Result<f32, NTMError> {
    let count = check_eval_shapes(logits, targets, mask)?;
    let mut correct = 0usize;
    Zip::from(logits.lanes(Axis(2)))
        .and(targets.lanes(Axis(2)))
        .and(mask)
        .for_each(|x, y, &m| {
            if m {
                correct += x.iter().zip(y.iter()).filter(|&(&x, &y)| (x > 0.0) == (y > 0.5)).count();
            }
        });
    Ok(correct as f32 / count as f32)
}
