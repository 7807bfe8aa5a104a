// src/aproar/ntm/write_head.rs ~=#######D]======A===r===c====M===o===o===n=====<Lord[NTM]Xyn>=====S===t===u===d===i===o===s======[R|$>
use super::*;
use super::addressing::softmax;
use super::layers::{sigmoid, softplus};

/// Activated addressing and write parameters of one head.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadParams {
    /// Content key and sharpness, absent without content addressing.
    pub content: Option<(Array1<f32>, f32)>,
    pub gate: f32,
    pub shift: Array1<f32>,
    pub gamma: f32,
    pub erase: Array1<f32>,
    pub add: Array1<f32>,
}

/// Turns raw controller output into head weightings and erase/add vectors.
///
/// Raw layout per head, with content addressing:
/// `key[W] | beta | g | shift[S] | gamma | erase[W] | add[W]`,
/// without it: `shift[S] | gamma | erase[W] | add[W]`.
#[derive(Debug, Clone)]
pub struct WriteHead {
    addressing: AddressingMechanism,
    memory_vector_size: usize,
    is_cam: bool,
}

impl WriteHead {
    pub fn new(memory_size: usize, memory_vector_size: usize, num_shift: usize, is_cam: bool) -> Self {
        WriteHead {
            addressing: AddressingMechanism::new(memory_size, memory_vector_size, num_shift),
            memory_vector_size,
            is_cam,
        }
    }

    fn content_size(&self) -> usize {
        if self.is_cam {
            self.memory_vector_size + 2
        } else {
            0
        }
    }

    pub fn param_size(&self) -> usize {
        self.content_size() + self.addressing.num_shift() + 1 + 2 * self.memory_vector_size
    }

    pub fn parse(&self, raw: ArrayView1<f32>) -> Result<HeadParams, NTMError> {
        if raw.len() != self.param_size() {
            return Err(NTMError::shape(&[self.param_size()], &[raw.len()]));
        }
        let width = self.memory_vector_size;
        let num_shift = self.addressing.num_shift();

        let (content, gate) = if self.is_cam {
            let key = raw.slice(s![..width]).to_owned();
            let beta = softplus(raw[width]);
            let gate = sigmoid(raw[width + 1]);
            (Some((key, beta)), gate)
        } else {
            (None, 0.0)
        };

        let mut idx = self.content_size();
        let shift = softmax(&raw.slice(s![idx..idx + num_shift]).to_owned())?;
        idx += num_shift;
        let gamma = 1.0 + softplus(raw[idx]);
        idx += 1;
        let erase = raw.slice(s![idx..idx + width]).mapv(sigmoid);
        idx += width;
        let add = raw.slice(s![idx..idx + width]).to_owned();

        Ok(HeadParams { content, gate, shift, gamma, erase, add })
    }

    /// Content focus, interpolation with the previous weighting, shift, sharpen.
    pub fn get_weights(&self, params: &HeadParams, prev_weights: ArrayView1<f32>, memory: ArrayView2<f32>) -> Result<Array1<f32>, NTMError> {
        let w_g = match &params.content {
            Some((key, beta)) => {
                let w_c = self.addressing.content_addressing(key.view(), *beta, memory)?;
                self.addressing.interpolate(prev_weights, w_c.view(), params.gate)?
            }
            None => normalize(&prev_weights.to_owned()),
        };
        let w_s = self.addressing.shift(w_g.view(), params.shift.view())?;
        self.addressing.sharpen(w_s.view(), params.gamma)
    }
}
