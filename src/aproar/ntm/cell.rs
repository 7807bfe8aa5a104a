// src/aproar/ntm/cell.rs ~=#######D]======A===r===c====M===o===o===n=====<Lord[NTM]Xyn>=====S===t===u===d===i===o===s======[R|$>
use super::*;
use super::controller::{Controller, ControllerState};
use super::layers::{sigmoid, Linear};
use crate::config::NTMConfig;
use crate::constants::EPSILON;
use ndarray::concatenate;
use rand::Rng;
use tracing::trace;

/// Everything carried from one timestep to the next.
#[derive(Debug, Clone, PartialEq)]
pub struct NTMState {
    pub controller: ControllerState,
    /// Head attention `[batch, heads, addresses]`.
    pub weights: Array3<f32>,
    /// Slowly gated attention blended in by the three-way gate.
    pub dynamic_weights: Array3<f32>,
    pub memory: Memory,
}

/// One NTM timestep: gated addressing, read, controller, write.
#[derive(Debug, Clone)]
pub struct NTMCell {
    num_heads: usize,
    memory_size: usize,
    input_size: usize,
    i2w: Linear,
    i2w_dynamic: Linear,
    interface: Interface,
    controller: Controller,
}

impl NTMCell {
    pub fn new<R: Rng + ?Sized>(config: &NTMConfig, rng: &mut R) -> Result<Self, NTMError> {
        config.validate()?;
        let state_in = config.state_units + config.input_size;
        let interface = Interface::new(
            config.num_heads,
            config.is_cam,
            config.num_shift,
            config.memory_addresses,
            config.memory_content_size,
        );
        let i2w = Linear::new(state_in, config.num_heads, rng);
        let i2w_dynamic = Linear::new(state_in, 3 * config.num_heads, rng);
        let controller = Controller::new(
            config.controller,
            config.input_size,
            config.output_size,
            config.state_units,
            interface.read_size(),
            interface.update_size(),
            rng,
        );

        Ok(NTMCell {
            num_heads: config.num_heads,
            memory_size: config.memory_addresses,
            input_size: config.input_size,
            i2w,
            i2w_dynamic,
            interface,
            controller,
        })
    }

    pub fn interface(&self) -> &Interface {
        &self.interface
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Zero controller and memory, attention focused on address 0.
    pub fn init_state(&self, batch_size: usize) -> NTMState {
        let weights = address_zero(batch_size, self.num_heads, self.memory_size);
        NTMState {
            controller: self.controller.init_state(batch_size),
            dynamic_weights: weights.clone(),
            weights,
            memory: Memory::new(batch_size, self.memory_size, self.interface.memory_vector_size()),
        }
    }

    pub fn step(&self, input: &Array2<f32>, state: NTMState) -> Result<(Array2<f32>, NTMState), NTMError> {
        let batch = input.nrows();
        if input.ncols() != self.input_size {
            return Err(NTMError::shape(&[batch, self.input_size], input.shape()));
        }
        let NTMState { controller, weights, dynamic_weights, memory } = state;
        if memory.batch_size() != batch {
            return Err(NTMError::shape(&[batch], &[memory.batch_size()]));
        }

        // step 0: gates deciding between address 0, previous and dynamic attention
        let combined = concatenate(Axis(1), &[controller.hidden.view(), input.view()])?;
        let f = self.i2w.forward(combined.view())?.mapv(sigmoid).insert_axis(Axis(2));
        let h = self
            .i2w_dynamic
            .forward(combined.view())?
            .mapv(sigmoid)
            .into_shape((batch, self.num_heads, 3))?;
        let h = normalize_gates(&h);

        let dynamic_weights = blend_dynamic(&weights, &dynamic_weights, &f);
        let weights = blend_three_way(&h, &address_zero(batch, self.num_heads, self.memory_size), &weights, &dynamic_weights);

        // step 1: read from memory using attention
        let read_data = self.interface.read(&weights, &memory)?;

        // step 2: controller
        let (output, controller, update_data) = self.controller.forward(input, &controller, &read_data)?;

        // step 3: update memory and attention
        let (weights, memory) = self.interface.update(&update_data, &weights, memory)?;
        trace!(batch, heads = self.num_heads, "NTM cell step complete");

        Ok((output, NTMState { controller, weights, dynamic_weights, memory }))
    }
}

/// One-hot attention at address 0 for every batch element and head.
pub fn address_zero(batch_size: usize, num_heads: usize, memory_size: usize) -> Array3<f32> {
    let mut w = Array3::zeros((batch_size, num_heads, memory_size));
    w.slice_mut(s![.., .., 0]).fill(1.0);
    w
}

/// Sum-normalises the gate triple of each head.
pub fn normalize_gates(h: &Array3<f32>) -> Array3<f32> {
    let total = h.sum_axis(Axis(2)).insert_axis(Axis(2));
    h / &(total + EPSILON)
}

/// `(1 - f) * weights + f * dynamic` with `f` shaped `[batch, heads, 1]`.
pub fn blend_dynamic(weights: &Array3<f32>, dynamic: &Array3<f32>, f: &Array3<f32>) -> Array3<f32> {
    weights * &(1.0 - f) + dynamic * f
}

/// `h0 * address_0 + h1 * weights + h2 * dynamic`, renormalised per head.
pub fn blend_three_way(h: &Array3<f32>, address_0: &Array3<f32>, weights: &Array3<f32>, dynamic: &Array3<f32>) -> Array3<f32> {
    let gate = |k: usize| h.slice(s![.., .., k..k + 1]).to_owned();
    let mut blended = address_0 * &gate(0) + weights * &gate(1) + dynamic * &gate(2);
    for mut row in blended.rows_mut() {
        let normalized = normalize(&row.to_owned());
        row.assign(&normalized);
    }
    blended
}
