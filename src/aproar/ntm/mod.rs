// src/aproar/ntm/mod.rs ~=#######D]======A===r===c====M===o===o===n=====<Lord[NTM]Xyn>=====S===t===u===d===i===o===s======[R|$>
pub mod addressing;
pub mod cell;
pub mod controller;
pub mod interface;
pub mod layers;
pub mod memory;
pub mod read_head;
pub mod write_head;

pub use addressing::{normalize, AddressingMechanism};
pub use cell::{NTMCell, NTMState};
pub use controller::{Controller, ControllerState, ControllerType};
pub use interface::Interface;
pub use memory::Memory;
pub use read_head::ReadHead;
pub use write_head::{HeadParams, WriteHead};

use ndarray::{s, Array1, Array2, Array3, ArrayView1, ArrayView2, Axis};
use crate::config::{AppContext, NTMConfig};
use crate::omnixtracker::omnixerror::NTMError;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

/// Runs an [`NTMCell`] over the time axis of `[batch, time, input]` sequences.
#[derive(Debug, Clone)]
pub struct NTM {
    cell: NTMCell,
    config: NTMConfig,
}

impl NTM {
    pub fn new(config: &NTMConfig, context: &AppContext) -> Result<Self, NTMError> {
        info!(
            controller = %config.controller,
            heads = config.num_heads,
            addresses = config.memory_addresses,
            content = config.memory_content_size,
            "Initializing NTM..."
        );
        let mut rng = StdRng::seed_from_u64(context.component_seed("ntm"));
        let cell = NTMCell::new(config, &mut rng)?;
        Ok(Self { cell, config: config.clone() })
    }

    pub fn config(&self) -> &NTMConfig {
        &self.config
    }

    pub fn cell(&self) -> &NTMCell {
        &self.cell
    }

    pub fn init_state(&self, batch_size: usize) -> NTMState {
        self.cell.init_state(batch_size)
    }

    /// Output logits `[batch, time, output]` from a freshly initialised state.
    pub fn forward(&self, inputs: &Array3<f32>) -> Result<Array3<f32>, NTMError> {
        self.run(inputs, false).map(|(outputs, _)| outputs)
    }

    /// Like [`NTM::forward`], also returning the head attention after every step.
    pub fn forward_with_trace(&self, inputs: &Array3<f32>) -> Result<(Array3<f32>, Vec<Array3<f32>>), NTMError> {
        self.run(inputs, true)
    }

    fn run(&self, inputs: &Array3<f32>, keep_trace: bool) -> Result<(Array3<f32>, Vec<Array3<f32>>), NTMError> {
        let (batch, time, width) = inputs.dim();
        if width != self.config.input_size {
            return Err(NTMError::shape(&[batch, time, self.config.input_size], inputs.shape()));
        }
        debug!(batch, time, "Forward pass initiated...");

        let mut outputs = Array3::zeros((batch, time, self.config.output_size));
        let mut trace = Vec::with_capacity(if keep_trace { time } else { 0 });
        let mut state = self.init_state(batch);
        for t in 0..time {
            let input = inputs.index_axis(Axis(1), t).to_owned();
            let (output, next) = self.cell.step(&input, state)?;
            outputs.index_axis_mut(Axis(1), t).assign(&output);
            if keep_trace {
                trace.push(next.weights.clone());
            }
            state = next;
        }
        Ok((outputs, trace))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_shapes_and_trace() {
        let config = NTMConfig {
            input_size: 5,
            output_size: 3,
            memory_addresses: 10,
            memory_content_size: 4,
            state_units: 16,
            ..NTMConfig::default()
        };
        let ntm = NTM::new(&config, &AppContext::with_seed(1)).unwrap();
        let inputs = Array3::from_shape_fn((2, 7, 5), |(b, t, i)| ((b * 7 + t + i) % 3) as f32 * 0.5);

        let (outputs, trace) = ntm.forward_with_trace(&inputs).unwrap();
        assert_eq!(outputs.dim(), (2, 7, 3));
        assert_eq!(trace.len(), 7);
        assert_eq!(trace[0].dim(), (2, config.num_heads, 10));
        assert_eq!(ntm.forward(&inputs).unwrap(), outputs);
    }

    #[test]
    fn test_same_seed_same_model() {
        let config = NTMConfig::default();
        let inputs = Array3::from_elem((1, 3, config.input_size), 1.0);
        let a = NTM::new(&config, &AppContext::with_seed(3)).unwrap().forward(&inputs).unwrap();
        let b = NTM::new(&config, &AppContext::with_seed(3)).unwrap().forward(&inputs).unwrap();
        let c = NTM::new(&config, &AppContext::with_seed(4)).unwrap().forward(&inputs).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_forward_rejects_wrong_width() {
        let ntm = NTM::new(&NTMConfig::default(), &AppContext::with_seed(1)).unwrap();
        let inputs = Array3::zeros((1, 2, NTMConfig::default().input_size + 1));
        assert!(matches!(ntm.forward(&inputs), Err(NTMError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = NTMConfig { memory_addresses: 0, ..NTMConfig::default() };
        assert!(NTM::new(&config, &AppContext::with_seed(1)).is_err());
    }
}
