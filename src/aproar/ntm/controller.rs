// src/aproar/ntm/controller.rs ~=#######D]======A===r===c====M===o===o===n=====<Lord[NTM]Xyn>=====S===t===u===d===i===o===s======[R|$>
use super::*;
use super::layers::{Linear, Lstm};
use ndarray::concatenate;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerType {
    FeedForward,
    Lstm,
}

impl FromStr for ControllerType {
    type Err = NTMError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "feedforward" | "feed_forward" | "ffn" => Ok(ControllerType::FeedForward),
            "lstm" => Ok(ControllerType::Lstm),
            other => Err(NTMError::InvalidArgument(format!("unknown controller type '{}'", other))),
        }
    }
}

impl fmt::Display for ControllerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerType::FeedForward => write!(f, "feedforward"),
            ControllerType::Lstm => write!(f, "lstm"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControllerState {
    pub hidden: Array2<f32>,
    /// LSTM cell state; `None` for feed-forward controllers.
    pub cell: Option<Array2<f32>>,
}

#[derive(Debug, Clone)]
enum Core {
    FeedForward(Linear),
    Lstm(Lstm),
}

/// Maps `[input, read]` to a new hidden state, then projects that state to
/// the cell output and to the interface's update parameters.
#[derive(Debug, Clone)]
pub struct Controller {
    core: Core,
    input_size: usize,
    read_size: usize,
    state_units: usize,
    state_to_output: Linear,
    state_to_update: Linear,
}

impl Controller {
    pub fn new<R: Rng + ?Sized>(
        kind: ControllerType,
        input_size: usize,
        output_units: usize,
        state_units: usize,
        read_size: usize,
        update_size: usize,
        rng: &mut R,
    ) -> Self {
        let core_in = input_size + read_size;
        let core = match kind {
            ControllerType::FeedForward => Core::FeedForward(Linear::new(core_in, state_units, rng)),
            ControllerType::Lstm => Core::Lstm(Lstm::new(core_in, state_units, rng)),
        };
        Controller {
            core,
            input_size,
            read_size,
            state_units,
            state_to_output: Linear::new(state_units, output_units, rng),
            state_to_update: Linear::new(state_units, update_size, rng),
        }
    }

    pub fn kind(&self) -> ControllerType {
        match self.core {
            Core::FeedForward(_) => ControllerType::FeedForward,
            Core::Lstm(_) => ControllerType::Lstm,
        }
    }

    pub fn state_units(&self) -> usize {
        self.state_units
    }

    pub fn init_state(&self, batch_size: usize) -> ControllerState {
        let zeros = Array2::zeros((batch_size, self.state_units));
        ControllerState {
            cell: matches!(self.core, Core::Lstm(_)).then(|| zeros.clone()),
            hidden: zeros,
        }
    }

    /// Returns `(output, new_state, update_data)`.
    pub fn forward(
        &self,
        input: &Array2<f32>,
        state: &ControllerState,
        read_data: &Array2<f32>,
    ) -> Result<(Array2<f32>, ControllerState, Array2<f32>), NTMError> {
        let batch = input.nrows();
        if input.ncols() != self.input_size {
            return Err(NTMError::shape(&[batch, self.input_size], input.shape()));
        }
        if read_data.dim() != (batch, self.read_size) {
            return Err(NTMError::shape(&[batch, self.read_size], read_data.shape()));
        }

        let combined = concatenate(Axis(1), &[input.view(), read_data.view()])?;
        let new_state = match (&self.core, &state.cell) {
            (Core::FeedForward(layer), _) => ControllerState {
                hidden: layer.forward(combined.view())?.mapv(f32::tanh),
                cell: None,
            },
            (Core::Lstm(lstm), Some(cell)) => {
                let (hidden, cell) = lstm.forward(combined.view(), state.hidden.view(), cell.view())?;
                ControllerState { hidden, cell: Some(cell) }
            }
            (Core::Lstm(_), None) => {
                return Err(NTMError::InvalidArgument("LSTM controller state is missing its cell".to_string()));
            }
        };

        let output = self.state_to_output.forward(new_state.hidden.view())?;
        let update_data = self.state_to_update.forward(new_state.hidden.view())?;
        Ok((output, new_state, update_data))
    }
}
