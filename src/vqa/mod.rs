// src/vqa/mod.rs ~=#######D]======A===r===c====M===o===o===n=====<Lord[VQA]Xyn>=====S===t===u===d===i===o===s======[R|$>

pub mod stacked_attention;

pub use stacked_attention::{AttentionLayer, StackedAttention};

use crate::aproar::ntm::layers::{relu, Linear, Lstm};
use crate::config::{AppContext, VqaConfig};
use crate::omnixtracker::omnixerror::NTMError;
use ndarray::{Array2, Array3, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

/// The question fed to [`StackedAttentionVQA::forward`].
#[derive(Debug, Clone, Copy)]
pub enum Question<'a> {
    /// Already encoded, `[B, encoded_question_size]`.
    Encoded(&'a Array2<f32>),
    /// Word embeddings `[B, T, word_embedded_size]`, encoded by the LSTM.
    Words(&'a Array3<f32>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct VqaOutput {
    /// `[B, num_classes]`
    pub log_probs: Array2<f32>,
    /// `[B, regions, num_attention_layers]`
    pub attention: Array3<f32>,
}

/// Stacked LSTM whose top hidden state after the last word is the encoding.
#[derive(Debug, Clone)]
pub struct QuestionEncoder {
    layers: Vec<Lstm>,
}

impl QuestionEncoder {
    pub fn new<R: Rng + ?Sized>(input_size: usize, hidden_size: usize, num_layers: usize, rng: &mut R) -> Self {
        let layers = (0..num_layers)
            .map(|l| Lstm::new(if l == 0 { input_size } else { hidden_size }, hidden_size, rng))
            .collect();
        Self { layers }
    }

    pub fn forward(&self, words: &Array3<f32>) -> Result<Array2<f32>, NTMError> {
        let (batch, time, _) = words.dim();
        let hidden_size = self.layers.first().map_or(0, Lstm::hidden_size);
        let mut states: Vec<(Array2<f32>, Array2<f32>)> =
            vec![(Array2::zeros((batch, hidden_size)), Array2::zeros((batch, hidden_size))); self.layers.len()];

        for t in 0..time {
            let mut x = words.index_axis(Axis(1), t).to_owned();
            for (lstm, state) in self.layers.iter().zip(states.iter_mut()) {
                let (h, c) = lstm.forward(x.view(), state.0.view(), state.1.view())?;
                x = h.clone();
                *state = (h, c);
            }
        }
        Ok(states.pop().map(|(h, _)| h).unwrap_or_else(|| Array2::zeros((batch, hidden_size))))
    }
}

/// `relu(fc1) -> relu(fc2) -> fc3 -> log_softmax`.
#[derive(Debug, Clone)]
pub struct Classifier {
    fc1: Linear,
    fc2: Linear,
    fc3: Linear,
}

impl Classifier {
    pub fn new<R: Rng + ?Sized>(in_features: usize, mid_features: usize, out_features: usize, rng: &mut R) -> Self {
        Self {
            fc1: Linear::new(in_features, mid_features, rng),
            fc2: Linear::new(mid_features, mid_features, rng),
            fc3: Linear::new(mid_features, out_features, rng),
        }
    }

    pub fn forward(&self, x: &Array2<f32>) -> Result<Array2<f32>, NTMError> {
        let x = self.fc1.forward(x.view())?.mapv(relu);
        let x = self.fc2.forward(x.view())?.mapv(relu);
        Ok(log_softmax_rows(&self.fc3.forward(x.view())?))
    }
}

pub fn log_softmax_rows(x: &Array2<f32>) -> Array2<f32> {
    let mut out = x.clone();
    for mut row in out.rows_mut() {
        let max = row.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
        let log_sum = row.mapv(|v| (v - max).exp()).sum().ln() + max;
        row.mapv_inplace(|v| v - log_sum);
    }
    out
}

/// Question-guided multi-hop attention over image region features.
#[derive(Debug, Clone)]
pub struct StackedAttentionVQA {
    config: VqaConfig,
    question_encoder: Option<QuestionEncoder>,
    question_to_query: Linear,
    attention: StackedAttention,
    classifier: Classifier,
}

impl StackedAttentionVQA {
    pub fn new(config: &VqaConfig, context: &AppContext) -> Result<Self, NTMError> {
        config.validate()?;
        info!(
            channels = config.image_encoding_channels,
            layers = config.num_attention_layers,
            classes = config.num_classes,
            "Initializing stacked attention VQA..."
        );
        let mut rng = StdRng::seed_from_u64(context.component_seed("vqa"));
        let question_encoder = config.use_question_encoding.then(|| {
            QuestionEncoder::new(
                config.word_embedded_size,
                config.encoded_question_size,
                config.question_lstm_layers,
                &mut rng,
            )
        });

        Ok(Self {
            question_encoder,
            question_to_query: Linear::new(config.encoded_question_size, config.image_encoding_channels, &mut rng),
            attention: StackedAttention::new(
                config.image_encoding_channels,
                config.key_query_size,
                config.num_attention_layers,
                &mut rng,
            ),
            classifier: Classifier::new(
                config.image_encoding_channels,
                config.classifier_mid_features,
                config.num_classes,
                &mut rng,
            ),
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &VqaConfig {
        &self.config
    }

    /// `images` holds encoded region features `[B, R, image_encoding_channels]`.
    pub fn forward(&self, images: &Array3<f32>, question: Question<'_>) -> Result<VqaOutput, NTMError> {
        let (batch, regions, channels) = images.dim();
        if channels != self.config.image_encoding_channels {
            return Err(NTMError::shape(&[batch, regions, self.config.image_encoding_channels], images.shape()));
        }

        let encoded = match (question, &self.question_encoder) {
            (Question::Encoded(q), None) => q.clone(),
            (Question::Words(words), Some(encoder)) => encoder.forward(words)?,
            (Question::Encoded(_), Some(_)) => {
                return Err(NTMError::InvalidArgument("model expects word embeddings for the question".to_string()));
            }
            (Question::Words(_), None) => {
                return Err(NTMError::InvalidArgument("model expects an encoded question".to_string()));
            }
        };
        if encoded.nrows() != batch {
            return Err(NTMError::shape(&[batch, self.config.encoded_question_size], encoded.shape()));
        }

        let query = self.question_to_query.forward(encoded.view())?;
        let (attended, attention) = self.attention.forward(images, &query)?;
        let log_probs = self.classifier.forward(&attended)?;
        debug!(batch, regions, "VQA forward pass complete");
        Ok(VqaOutput { log_probs, attention })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn small_config(use_question_encoding: bool) -> VqaConfig {
        VqaConfig {
            image_encoding_channels: 8,
            encoded_question_size: 5,
            word_embedded_size: 4,
            use_question_encoding,
            question_lstm_layers: 2,
            key_query_size: 6,
            num_attention_layers: 2,
            classifier_mid_features: 12,
            num_classes: 3,
        }
    }

    fn images() -> Array3<f32> {
        Array3::from_shape_fn((2, 9, 8), |(b, r, c)| ((b * 3 + r * 5 + c) % 7) as f32 / 7.0)
    }

    #[test]
    fn test_log_probs_normalise() {
        let model = StackedAttentionVQA::new(&small_config(false), &AppContext::with_seed(1)).unwrap();
        let question = Array2::from_elem((2, 5), 0.5);
        let output = model.forward(&images(), Question::Encoded(&question)).unwrap();

        assert_eq!(output.log_probs.dim(), (2, 3));
        assert_eq!(output.attention.dim(), (2, 9, 2));
        for row in output.log_probs.rows() {
            assert_abs_diff_eq!(row.mapv(f32::exp).sum(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_word_questions_go_through_lstm() {
        let model = StackedAttentionVQA::new(&small_config(true), &AppContext::with_seed(1)).unwrap();
        let words = Array3::from_shape_fn((2, 6, 4), |(b, t, e)| ((b + t + e) % 3) as f32 - 1.0);
        let output = model.forward(&images(), Question::Words(&words)).unwrap();
        assert_eq!(output.log_probs.dim(), (2, 3));

        let encoded = Array2::zeros((2, 5));
        assert!(model.forward(&images(), Question::Encoded(&encoded)).is_err());
    }

    #[test]
    fn test_rejects_wrong_channel_count() {
        let model = StackedAttentionVQA::new(&small_config(false), &AppContext::with_seed(1)).unwrap();
        let question = Array2::zeros((1, 5));
        assert!(matches!(
            model.forward(&Array3::zeros((1, 4, 7)), Question::Encoded(&question)),
            Err(NTMError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_log_softmax_rows() {
        let x = Array2::from_shape_vec((1, 2), vec![0.0, 0.0]).unwrap();
        assert_abs_diff_eq!(log_softmax_rows(&x)[[0, 1]], -(2.0f32.ln()), epsilon = 1e-6);
    }
}
