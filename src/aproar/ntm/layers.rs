// src/aproar/ntm/layers.rs ~=#######D]======A===r===c====M===o===o===n=====<Lord[NTM]Xyn>=====S===t===u===d===i===o===s======[R|$>

use ndarray::{Array1, Array2, Array3, ArrayView2, Axis};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;
use crate::omnixtracker::omnixerror::NTMError;

pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

pub fn softplus(x: f32) -> f32 {
    // ln(1 + e^x) without overflow for large x
    if x > 20.0 {
        x
    } else {
        x.exp().ln_1p()
    }
}

pub fn relu(x: f32) -> f32 {
    x.max(0.0)
}

/// Fully connected layer, `y = x W^T + b`.
#[derive(Debug, Clone)]
pub struct Linear {
    weight: Array2<f32>,
    bias: Array1<f32>,
}

impl Linear {
    pub fn new<R: Rng + ?Sized>(in_features: usize, out_features: usize, rng: &mut R) -> Self {
        let bound = 1.0 / (in_features.max(1) as f32).sqrt();
        Linear {
            weight: Array2::random_using((out_features, in_features), Uniform::new_inclusive(-bound, bound), rng),
            bias: Array1::random_using(out_features, Uniform::new_inclusive(-bound, bound), rng),
        }
    }

    pub fn from_parts(weight: Array2<f32>, bias: Array1<f32>) -> Result<Self, NTMError> {
        if weight.nrows() != bias.len() {
            return Err(NTMError::shape(&[weight.nrows()], &[bias.len()]));
        }
        Ok(Linear { weight, bias })
    }

    pub fn in_features(&self) -> usize {
        self.weight.ncols()
    }

    pub fn out_features(&self) -> usize {
        self.weight.nrows()
    }

    pub fn forward(&self, x: ArrayView2<f32>) -> Result<Array2<f32>, NTMError> {
        if x.ncols() != self.in_features() {
            return Err(NTMError::shape(&[x.nrows(), self.in_features()], x.shape()));
        }
        Ok(x.dot(&self.weight.t()) + &self.bias)
    }

    /// Applies the layer to the last axis of a `[B, R, in]` array.
    pub fn forward3(&self, x: &Array3<f32>) -> Result<Array3<f32>, NTMError> {
        let (b, r, c) = x.dim();
        let flat = x.to_shape((b * r, c))?;
        let y = self.forward(flat.view())?;
        Ok(y.into_shape((b, r, self.out_features()))?)
    }
}

/// Fused-gate LSTM cell, gates ordered input, forget, cell, output.
#[derive(Debug, Clone)]
pub struct Lstm {
    weight_ih: Array2<f32>,
    weight_hh: Array2<f32>,
    bias_ih: Array1<f32>,
    bias_hh: Array1<f32>,
    hidden_size: usize,
}

impl Lstm {
    pub fn new<R: Rng + ?Sized>(input_size: usize, hidden_size: usize, rng: &mut R) -> Self {
        let bound = 1.0 / (hidden_size.max(1) as f32).sqrt();
        let dist = Uniform::new_inclusive(-bound, bound);
        Lstm {
            weight_ih: Array2::random_using((4 * hidden_size, input_size), dist, rng),
            weight_hh: Array2::random_using((4 * hidden_size, hidden_size), dist, rng),
            bias_ih: Array1::zeros(4 * hidden_size),
            bias_hh: Array1::zeros(4 * hidden_size),
            hidden_size,
        }
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// One step over a batch. Returns the new `(hidden, cell)`.
    pub fn forward(
        &self,
        input: ArrayView2<f32>,
        hidden: ArrayView2<f32>,
        cell: ArrayView2<f32>,
    ) -> Result<(Array2<f32>, Array2<f32>), NTMError> {
        if input.ncols() != self.weight_ih.ncols() {
            return Err(NTMError::shape(&[input.nrows(), self.weight_ih.ncols()], input.shape()));
        }
        if hidden.dim() != (input.nrows(), self.hidden_size) || hidden.dim() != cell.dim() {
            return Err(NTMError::shape(&[input.nrows(), self.hidden_size], hidden.shape()));
        }

        let gates = input.dot(&self.weight_ih.t()) + &self.bias_ih + hidden.dot(&self.weight_hh.t()) + &self.bias_hh;
        let chunked_gates: Vec<_> = gates.axis_chunks_iter(Axis(1), self.hidden_size).collect();

        let i = chunked_gates[0].mapv(sigmoid);
        let f = chunked_gates[1].mapv(sigmoid);
        let g = chunked_gates[2].mapv(f32::tanh);
        let o = chunked_gates[3].mapv(sigmoid);

        let c = &f * &cell + &i * &g;
        let h = &o * &c.mapv(f32::tanh);

        Ok((h, c))
    }
}
