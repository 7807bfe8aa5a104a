// src/aproar/mod.rs ~=#######D]======A===r===c====M===o===o===n=====<Lord[APROAR]Xyn>=====S===t===u===d===i===o===s======[R|$>

pub mod ntm;

use crate::aproar::ntm::NTM;
use crate::config::{validate_section, AppContext, CurriculumConfig, NTMConfig};
use crate::omnixtracker::omnixerror::NTMError;
use crate::omnixtracker::{OmniXError, OmniXMetry};
use crate::problems::{masked_bce_with_logits, masked_bit_accuracy, BatchGenerator, Curriculum};
use ndarray::{Array3, Axis};
use ndarray_stats::QuantileExt;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeStats {
    pub episode: usize,
    pub seq_length: usize,
    pub loss: f32,
    pub accuracy: f32,
    pub curriculum_done: bool,
}

/// Drives an NTM over batches from a generator and records how it does.
pub struct EpisodeRunner {
    ntm: NTM,
    generator: Box<dyn BatchGenerator>,
    curriculum: Option<Curriculum>,
    metrics: OmniXMetry,
    visualize: bool,
}

impl EpisodeRunner {
    pub fn new(
        ntm: NTM,
        generator: Box<dyn BatchGenerator>,
        curriculum: Option<Curriculum>,
        metrics: OmniXMetry,
    ) -> Result<Self, OmniXError> {
        let config = ntm.config();
        if config.input_size != generator.input_size() || config.output_size != generator.output_size() {
            return Err(NTMError::shape(
                &[generator.input_size(), generator.output_size()],
                &[config.input_size, config.output_size],
            )
            .into());
        }
        info!(
            problem = generator.name(),
            curriculum = curriculum.is_some(),
            "Episode runner ready"
        );
        Ok(Self { ntm, generator, curriculum, metrics, visualize: false })
    }

    /// Sizes the NTM to the generator and attaches the curriculum.
    pub fn from_parts(
        ntm_config: &NTMConfig,
        generator: Box<dyn BatchGenerator>,
        curriculum_config: &CurriculumConfig,
        context: &AppContext,
        metrics: OmniXMetry,
    ) -> Result<Self, OmniXError> {
        let ntm_config = NTMConfig {
            input_size: generator.input_size(),
            output_size: generator.output_size(),
            ..ntm_config.clone()
        };
        validate_section("ntm", ntm_config.validate())?;
        let ntm = NTM::new(&ntm_config, context)?;
        let curriculum = Curriculum::for_generator(curriculum_config, generator.as_ref());
        let mut runner = Self::new(ntm, generator, curriculum, metrics)?;
        runner.visualize = context.visualize;
        Ok(runner)
    }

    pub fn ntm(&self) -> &NTM {
        &self.ntm
    }

    pub fn generator(&self) -> &dyn BatchGenerator {
        self.generator.as_ref()
    }

    pub fn run_episode(&mut self, episode: usize) -> Result<EpisodeStats, OmniXError> {
        let start = Instant::now();
        let curriculum_done = match &self.curriculum {
            Some(curriculum) => curriculum.apply(self.generator.as_mut(), episode),
            None => true,
        };

        let batch = self.generator.generate_batch();
        debug!(
            episode,
            seq_length = batch.seq_length,
            time_steps = batch.time_steps(),
            "Generated batch"
        );

        let logits = if self.visualize {
            let (logits, trace) = self.ntm.forward_with_trace(&batch.inputs)?;
            log_attention_focus(episode, &trace);
            logits
        } else {
            self.ntm.forward(&batch.inputs)?
        };

        let loss = masked_bce_with_logits(&logits, &batch.targets, &batch.mask)?;
        let accuracy = masked_bit_accuracy(&logits, &batch.targets, &batch.mask)?;
        if !loss.is_finite() {
            return Err(OmniXError::NTMComputationError);
        }

        self.metrics.increment_counter("episodes.completed", 1);
        self.metrics.update_gauge("episode.loss", loss as f64);
        self.metrics.update_gauge("episode.accuracy", accuracy as f64);
        self.metrics.update_gauge("episode.seq_length", batch.seq_length as f64);
        self.metrics.record_histogram("episode.duration_ms", start.elapsed().as_secs_f64() * 1e3);

        let stats = EpisodeStats {
            episode,
            seq_length: batch.seq_length,
            loss,
            accuracy,
            curriculum_done,
        };
        info!(
            episode,
            seq_length = stats.seq_length,
            loss = stats.loss,
            accuracy = stats.accuracy,
            "Episode finished"
        );
        Ok(stats)
    }

    pub fn run(&mut self, episodes: usize) -> Result<Vec<EpisodeStats>, OmniXError> {
        (0..episodes).map(|episode| self.run_episode(episode)).collect()
    }
}

/// Logs the most attended address of head 0, batch element 0, per step.
fn log_attention_focus(episode: usize, trace: &[Array3<f32>]) {
    let focus: Vec<usize> = trace
        .iter()
        .filter_map(|weights| weights.index_axis(Axis(0), 0).index_axis(Axis(0), 0).argmax().ok())
        .collect();
    info!(episode, ?focus, "Attention focus per step");
}
