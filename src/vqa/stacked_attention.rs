// src/vqa/stacked_attention.rs ~=#######D]======A===r===c====M===o===o===n=====<Lord[VQA]Xyn>=====S===t===u===d===i===o===s======[R|$>

use crate::aproar::ntm::addressing::softmax;
use crate::aproar::ntm::layers::Linear;
use crate::omnixtracker::omnixerror::NTMError;
use ndarray::{stack, Array2, Array3, ArrayView2, Axis};
use rand::Rng;

/// One hop: the query scores every image region, and the attended image
/// summary is added back onto the query.
#[derive(Debug, Clone)]
pub struct AttentionLayer {
    image_to_key: Linear,
    query_to_key: Linear,
    key_to_score: Linear,
}

impl AttentionLayer {
    pub fn new<R: Rng + ?Sized>(channels: usize, key_query_size: usize, rng: &mut R) -> Self {
        Self {
            image_to_key: Linear::new(channels, key_query_size, rng),
            query_to_key: Linear::new(channels, key_query_size, rng),
            key_to_score: Linear::new(key_query_size, 1, rng),
        }
    }

    /// `images` is `[B, R, C]`, `query` is `[B, C]`. Returns the refined
    /// query `[B, C]` and the region distribution `[B, R]`.
    pub fn forward(&self, images: &Array3<f32>, query: &Array2<f32>) -> Result<(Array2<f32>, Array2<f32>), NTMError> {
        let (batch, regions, channels) = images.dim();
        if query.dim() != (batch, channels) {
            return Err(NTMError::shape(&[batch, channels], query.shape()));
        }

        let keys = self.image_to_key.forward3(images)?;
        let query_key = self.query_to_key.forward(query.view())?.insert_axis(Axis(1));
        let ha = (keys + &query_key).mapv(f32::tanh);
        let scores = self.key_to_score.forward3(&ha)?.index_axis_move(Axis(2), 0);

        let mut attention = Array2::zeros((batch, regions));
        for (mut row, score) in attention.rows_mut().into_iter().zip(scores.rows()) {
            row.assign(&softmax(&score.to_owned())?);
        }

        let weighted = images * &attention.view().insert_axis(Axis(2));
        let refined = weighted.sum_axis(Axis(1)) + query;
        Ok((refined, attention))
    }
}

/// `num_layers` attention hops applied in sequence.
#[derive(Debug, Clone)]
pub struct StackedAttention {
    layers: Vec<AttentionLayer>,
}

impl StackedAttention {
    pub fn new<R: Rng + ?Sized>(channels: usize, key_query_size: usize, num_layers: usize, rng: &mut R) -> Self {
        let layers = (0..num_layers)
            .map(|_| AttentionLayer::new(channels, key_query_size, rng))
            .collect();
        Self { layers }
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Returns the final query `[B, C]` and attention maps `[B, R, L]`.
    pub fn forward(&self, images: &Array3<f32>, query: &Array2<f32>) -> Result<(Array2<f32>, Array3<f32>), NTMError> {
        let mut query = query.clone();
        let mut maps = Vec::with_capacity(self.layers.len());
        for layer in &self.layers {
            let (refined, attention) = layer.forward(images, &query)?;
            query = refined;
            maps.push(attention);
        }
        let views: Vec<ArrayView2<f32>> = maps.iter().map(|m| m.view()).collect();
        let attention = stack(Axis(2), &views)?;
        Ok((query, attention))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_attention_maps_are_distributions() {
        let mut rng = StdRng::seed_from_u64(8);
        let attention = StackedAttention::new(6, 5, 3, &mut rng);
        let images = Array3::from_shape_fn((2, 4, 6), |(b, r, c)| ((b + 2 * r + c) % 5) as f32 * 0.3 - 0.5);
        let query = Array2::from_elem((2, 6), 0.1);

        let (refined, maps) = attention.forward(&images, &query).unwrap();
        assert_eq!(refined.dim(), (2, 6));
        assert_eq!(maps.dim(), (2, 4, 3));
        for b in 0..2 {
            for l in 0..3 {
                let column = maps.index_axis(Axis(0), b).index_axis(Axis(1), l).to_owned();
                assert!(column.iter().all(|&p| p >= 0.0));
                assert_abs_diff_eq!(column.sum(), 1.0, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn test_uniform_regions_return_their_features() {
        let mut rng = StdRng::seed_from_u64(1);
        let layer = AttentionLayer::new(3, 4, &mut rng);
        let images = Array3::from_shape_fn((1, 5, 3), |(_, _, c)| c as f32);
        let query = Array2::zeros((1, 3));
        let (refined, attention) = layer.forward(&images, &query).unwrap();
        for p in attention.iter() {
            assert_abs_diff_eq!(*p, 0.2, epsilon = 1e-6);
        }
        assert_abs_diff_eq!(refined[[0, 2]], 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_rejects_query_width_mismatch() {
        let mut rng = StdRng::seed_from_u64(1);
        let layer = AttentionLayer::new(3, 4, &mut rng);
        assert!(layer.forward(&Array3::zeros((1, 2, 3)), &Array2::zeros((1, 4))).is_err());
    }
}
