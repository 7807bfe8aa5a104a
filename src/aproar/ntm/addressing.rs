// src/aproar/ntm/addressing.rs ~=#######D]======A===r===c====M===o===o===n=====<Lord[NTM]Xyn>=====S===t===u===d===i===o===s======[R|$>

use ndarray::{Array1, ArrayView1, ArrayView2};
use ndarray_stats::QuantileExt;
use crate::constants::EPSILON;
use crate::omnixtracker::omnixerror::NTMError;

/// Content and location addressing over the `memory_size` slots of one
/// batch element. Every weighting it returns is a probability distribution.
#[derive(Debug, Clone)]
pub struct AddressingMechanism {
    memory_size: usize,
    key_size: usize,
    num_shift: usize,
}

impl AddressingMechanism {
    pub fn new(memory_size: usize, key_size: usize, num_shift: usize) -> Self {
        AddressingMechanism { memory_size, key_size, num_shift }
    }

    pub fn memory_size(&self) -> usize {
        self.memory_size
    }

    pub fn num_shift(&self) -> usize {
        self.num_shift
    }

    /// Softmax of `beta` times the cosine similarity between `key` and every
    /// memory row. Zero-norm rows or keys score 0.
    pub fn content_addressing(&self, key: ArrayView1<f32>, beta: f32, memory: ArrayView2<f32>) -> Result<Array1<f32>, NTMError> {
        if key.len() != self.key_size {
            return Err(NTMError::shape(&[self.key_size], &[key.len()]));
        }
        if memory.dim() != (self.memory_size, self.key_size) {
            return Err(NTMError::shape(&[self.memory_size, self.key_size], memory.shape()));
        }

        let key_norm = key.dot(&key).sqrt();
        let similarities: Array1<f32> = memory
            .outer_iter()
            .map(|row| row.dot(&key) / (row.dot(&row).sqrt() * key_norm + EPSILON))
            .collect();
        softmax(&(similarities * beta))
    }

    pub fn interpolate(&self, w_prev: ArrayView1<f32>, w_c: ArrayView1<f32>, g: f32) -> Result<Array1<f32>, NTMError> {
        if w_prev.len() != self.memory_size || w_c.len() != self.memory_size {
            return Err(NTMError::shape(
                &[self.memory_size, self.memory_size],
                &[w_prev.len(), w_c.len()],
            ));
        }
        if !(0.0..=1.0).contains(&g) {
            return Err(NTMError::InvalidArgument(format!("interpolation gate {} outside [0, 1]", g)));
        }
        Ok(normalize(&(&w_prev * (1.0 - g) + &w_c * g)))
    }

    /// Circular convolution with a kernel over offsets `-(S/2)..=S/2`; a
    /// positive offset moves attention towards higher slot indices.
    pub fn shift(&self, w: ArrayView1<f32>, s: ArrayView1<f32>) -> Result<Array1<f32>, NTMError> {
        if w.len() != self.memory_size || s.len() != self.num_shift {
            return Err(NTMError::shape(&[self.memory_size, self.num_shift], &[w.len(), s.len()]));
        }
        let n = self.memory_size as i64;
        let half = (self.num_shift / 2) as i64;
        let mut w_shifted = Array1::zeros(self.memory_size);
        for i in 0..self.memory_size {
            for (k, &s_k) in s.iter().enumerate() {
                let offset = k as i64 - half;
                let idx = (i as i64 - offset).rem_euclid(n) as usize;
                w_shifted[i] += w[idx] * s_k;
            }
        }
        Ok(normalize(&w_shifted))
    }

    pub fn sharpen(&self, w: ArrayView1<f32>, gamma: f32) -> Result<Array1<f32>, NTMError> {
        if w.len() != self.memory_size {
            return Err(NTMError::shape(&[self.memory_size], &[w.len()]));
        }
        if gamma < 1.0 || gamma.is_nan() {
            return Err(NTMError::InvalidArgument(format!("sharpening exponent {} below 1", gamma)));
        }
        // Scaled by the peak so large exponents cannot underflow the mass.
        let peak = w.fold(0.0f32, |m, &x| if x.is_finite() { m.max(x) } else { m });
        if peak <= 0.0 {
            return Ok(normalize(&w.to_owned()));
        }
        Ok(normalize(&w.mapv(|x| (x.max(0.0) / peak).powf(gamma))))
    }
}

pub fn softmax(x: &Array1<f32>) -> Result<Array1<f32>, NTMError> {
    if x.is_empty() {
        return Err(NTMError::InvalidArgument("Input array is empty in softmax function".to_string()));
    }

    if x.iter().any(|&a| a.is_nan()) {
        return Err(NTMError::InvalidArgument("Input array contains NaN values in softmax function".to_string()));
    }

    let max = *x.max().map_err(|_| NTMError::ComputationError)?;
    let exp = x.mapv(|a| (a - max).exp());
    let sum = exp.sum();
    Ok(exp / sum)
}

/// Clamps negatives to zero and rescales to unit mass. Falls back to the
/// uniform distribution when no mass is left at all.
pub fn normalize(w: &Array1<f32>) -> Array1<f32> {
    let clamped = w.mapv(|x| if x.is_finite() { x.max(0.0) } else { 0.0 });
    let total = clamped.sum();
    if !total.is_finite() || total < f32::MIN_POSITIVE {
        let len = w.len().max(1);
        return Array1::from_elem(w.len(), 1.0 / len as f32);
    }
    clamped / total
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, s, Array2};

    fn assert_distribution(w: &Array1<f32>) {
        assert!(w.iter().all(|&x| x >= 0.0), "negative entry in {:?}", w);
        assert_abs_diff_eq!(w.sum(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_content_addressing_prefers_matching_row() {
        let addressing = AddressingMechanism::new(3, 2, 3);
        let memory = array![[1.0, 0.0], [0.0, 1.0], [-1.0, 0.0]];
        let w = addressing.content_addressing(array![0.0, 2.0].view(), 10.0, memory.view()).unwrap();
        assert_distribution(&w);
        assert_eq!(w.argmax().unwrap(), 1);
    }

    #[test]
    fn test_content_addressing_zero_memory_is_uniform() {
        let addressing = AddressingMechanism::new(4, 3, 3);
        let memory = Array2::zeros((4, 3));
        let w = addressing.content_addressing(array![1.0, -1.0, 0.5].view(), 5.0, memory.view()).unwrap();
        for &x in w.iter() {
            assert_abs_diff_eq!(x, 0.25, epsilon = 1e-6);
        }

        let w = addressing.content_addressing(Array1::zeros(3).view(), 5.0, memory.view()).unwrap();
        assert!(w.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_content_addressing_shape_mismatch() {
        let addressing = AddressingMechanism::new(4, 3, 3);
        let memory = Array2::zeros((4, 3));
        let err = addressing.content_addressing(array![1.0, 2.0].view(), 1.0, memory.view()).unwrap_err();
        assert_eq!(err, NTMError::shape(&[3], &[2]));
    }

    #[test]
    fn test_shift_moves_attention_forward() {
        let addressing = AddressingMechanism::new(4, 2, 3);
        let w = array![0.0, 1.0, 0.0, 0.0];
        let shifted = addressing.shift(w.view(), array![0.0, 0.0, 1.0].view()).unwrap();
        assert_eq!(shifted, array![0.0, 0.0, 1.0, 0.0]);

        let wrapped = addressing.shift(array![1.0, 0.0, 0.0, 0.0].view(), array![1.0, 0.0, 0.0].view()).unwrap();
        assert_eq!(wrapped, array![0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_shift_and_sharpen_keep_distribution() {
        let addressing = AddressingMechanism::new(5, 2, 3);
        let w = array![0.1, 0.4, 0.2, 0.2, 0.1];
        let shifted = addressing.shift(w.view(), array![0.2, 0.5, 0.3].view()).unwrap();
        assert_distribution(&shifted);

        let sharpened = addressing.sharpen(shifted.view(), 3.0).unwrap();
        assert_distribution(&sharpened);
        assert!(sharpened.max().unwrap() >= shifted.max().unwrap());
    }

    #[test]
    fn test_interpolate_is_convex() {
        let addressing = AddressingMechanism::new(2, 2, 1);
        let w = addressing.interpolate(array![1.0, 0.0].view(), array![0.0, 1.0].view(), 0.25).unwrap();
        assert_abs_diff_eq!(w[0], 0.75, epsilon = 1e-6);
        assert_abs_diff_eq!(w[1], 0.25, epsilon = 1e-6);
        assert!(addressing.interpolate(array![1.0, 0.0].view(), array![0.0, 1.0].view(), 1.5).is_err());
    }

    #[test]
    fn test_softmax_rejects_nan() {
        assert!(softmax(&array![1.0, f32::NAN]).is_err());
        assert!(softmax(&Array1::zeros(0)).is_err());
    }

    #[test]
    fn test_large_gamma_keeps_peaks() {
        let addressing = AddressingMechanism::new(8, 2, 3);
        let tied = array![0.5, 0.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let sharpened = addressing.sharpen(tied.view(), 21.0).unwrap();
        assert_abs_diff_eq!(sharpened[0], 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(sharpened[1], 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(sharpened.slice(s![2..]).sum(), 0.0, epsilon = 1e-6);

        let mut leaning = Array1::from_elem(8, 0.1);
        leaning[0] = 0.3;
        let sharpened = addressing.sharpen(leaning.view(), 15.0).unwrap();
        assert_distribution(&sharpened);
        assert!(sharpened[0] > 0.9);
    }

    #[test]
    fn test_normalize_keeps_tiny_mass() {
        let w = normalize(&array![1e-9, 3e-9, 0.0, 0.0]);
        assert_abs_diff_eq!(w[0], 0.25, epsilon = 1e-5);
        assert_abs_diff_eq!(w[1], 0.75, epsilon = 1e-5);
    }

    #[test]
    fn test_normalize_underflow_falls_back_to_uniform() {
        let w = normalize(&array![0.0, -1.0, 0.0, 0.0]);
        assert_eq!(w, array![0.25, 0.25, 0.25, 0.25]);
    }
}
