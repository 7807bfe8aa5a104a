// src/problems/curriculum.rs ~=#######D]======A===r===c====M===o===o===n=====<Lord[PROBLEMS]Xyn>=====S===t===u===d===i===o===s======[R|$>

use super::BatchGenerator;
use crate::config::CurriculumConfig;
use tracing::info;

/// Grows a generator's maximum sequence length as episodes go by.
#[derive(Debug, Clone, PartialEq)]
pub struct Curriculum {
    initial_max_length: usize,
    interval: usize,
    step: usize,
    final_max_length: usize,
}

impl Curriculum {
    /// `None` when `config.interval` is zero.
    pub fn new(config: &CurriculumConfig, final_max_length: usize) -> Option<Self> {
        if config.interval == 0 {
            return None;
        }
        Some(Self {
            initial_max_length: config.initial_max_length.clamp(1, final_max_length.max(1)),
            interval: config.interval,
            step: config.step,
            final_max_length,
        })
    }

    /// Attaches to the generator's currently configured maximum.
    pub fn for_generator(config: &CurriculumConfig, generator: &dyn BatchGenerator) -> Option<Self> {
        Self::new(config, generator.max_length())
    }

    pub fn final_max_length(&self) -> usize {
        self.final_max_length
    }

    pub fn max_length_at(&self, episode: usize) -> usize {
        let grown = self.initial_max_length + (episode / self.interval) * self.step;
        grown.min(self.final_max_length)
    }

    /// Pushes the episode's maximum into the generator; true once the
    /// curriculum has reached its final length.
    pub fn apply(&self, generator: &mut dyn BatchGenerator, episode: usize) -> bool {
        let max_length = self.max_length_at(episode);
        if max_length != generator.max_length() {
            info!(episode, max_length, problem = generator.name(), "Curriculum raised max sequence length");
            generator.set_max_length(max_length);
        }
        max_length >= self.final_max_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppContext, ProblemConfig};
    use crate::problems::{DualSerialReverseRecall, SerialRecall};

    fn config(interval: usize) -> CurriculumConfig {
        CurriculumConfig { initial_max_length: 2, interval, step: 3 }
    }

    #[test]
    fn test_schedule() {
        let curriculum = Curriculum::new(&config(10), 10).unwrap();
        assert_eq!(curriculum.max_length_at(0), 2);
        assert_eq!(curriculum.max_length_at(9), 2);
        assert_eq!(curriculum.max_length_at(10), 5);
        assert_eq!(curriculum.max_length_at(25), 8);
        assert_eq!(curriculum.max_length_at(30), 10);
        assert_eq!(curriculum.max_length_at(1000), 10);
    }

    #[test]
    fn test_finished_curriculum_restores_min_length() {
        let problem_config = ProblemConfig {
            min_sequence_length: 5,
            max_sequence_length: 10,
            ..ProblemConfig::default()
        };
        let mut generator = DualSerialReverseRecall::new(&problem_config, &AppContext::with_seed(12)).unwrap();
        let curriculum_config = CurriculumConfig { initial_max_length: 3, interval: 1, step: 10 };
        let curriculum = Curriculum::for_generator(&curriculum_config, &generator).unwrap();

        assert!(!curriculum.apply(&mut generator, 0));
        assert_eq!((generator.min_length(), generator.max_length()), (3, 3));
        assert!(curriculum.apply(&mut generator, 5));
        assert_eq!((generator.min_length(), generator.max_length()), (5, 10));
        for _ in 0..30 {
            assert!(generator.generate_batch().seq_length >= 5);
        }
    }

    #[test]
    fn test_zero_interval_disables() {
        assert!(Curriculum::new(&config(0), 10).is_none());
    }

    #[test]
    fn test_apply_drives_generator() {
        let problem_config = ProblemConfig { control_bits: 1, max_sequence_length: 8, ..ProblemConfig::default() };
        let mut generator = SerialRecall::new(&problem_config, &AppContext::with_seed(4)).unwrap();
        let curriculum = Curriculum::for_generator(&config(5), &generator).unwrap();
        assert_eq!(curriculum.final_max_length(), 8);

        assert!(!curriculum.apply(&mut generator, 0));
        assert_eq!(generator.max_length(), 2);
        for _ in 0..10 {
            assert!(generator.generate_batch().seq_length <= 2);
        }

        assert!(!curriculum.apply(&mut generator, 5));
        assert_eq!(generator.max_length(), 5);
        assert!(curriculum.apply(&mut generator, 10));
        assert_eq!(generator.max_length(), 8);
    }
}
