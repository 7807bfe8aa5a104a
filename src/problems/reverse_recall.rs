// src/problems/reverse_recall.rs ~=#######D]======A===r===c====M===o===o===n=====<Lord[PROBLEMS]Xyn>=====S===t===u===d===i===o===s======[R|$>

use super::*;
use super::serial_recall::store_then_recall;
use crate::constants::{SERIAL_RECALL_MIN_CONTROL_BITS, SERIAL_RECALL_MIN_DATA_BITS};

/// Same input layout as [`SerialRecall`], but items must be recalled last
/// stored first.
#[derive(Debug, Clone)]
pub struct ReverseRecall {
    sampler: SequenceSampler,
}

impl ReverseRecall {
    pub const NAME: &'static str = "reverse_recall";

    pub fn new(config: &ProblemConfig, context: &AppContext) -> Result<Self, NTMError> {
        let sampler = SequenceSampler::new(
            Self::NAME,
            config,
            context,
            SERIAL_RECALL_MIN_CONTROL_BITS,
            SERIAL_RECALL_MIN_DATA_BITS,
        )?;
        Ok(Self { sampler })
    }
}

impl BatchGenerator for ReverseRecall {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn generate_batch(&mut self) -> DataTuple {
        store_then_recall(&mut self.sampler, true)
    }

    fn set_max_length(&mut self, max_length: usize) {
        self.sampler.set_max_length(max_length);
    }

    fn min_length(&self) -> usize {
        self.sampler.config().min_sequence_length
    }

    fn max_length(&self) -> usize {
        self.sampler.config().max_sequence_length
    }

    fn input_size(&self) -> usize {
        self.sampler.config().input_size()
    }

    fn output_size(&self) -> usize {
        self.sampler.config().data_bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targets_are_time_reversed() {
        let config = ProblemConfig {
            kind: ProblemKind::ReverseRecall,
            batch_size: 2,
            control_bits: 2,
            data_bits: 4,
            min_sequence_length: 4,
            max_sequence_length: 4,
            bias: 0.5,
            randomize_control_lines: false,
        };
        let mut problem = ReverseRecall::new(&config, &AppContext::with_seed(11)).unwrap();
        let batch = problem.generate_batch();
        assert_eq!(batch.seq_length, 4);
        assert_eq!(batch.inputs.dim(), (2, 8, 6));

        for k in 0..4 {
            assert_eq!(batch.targets.slice(s![.., 4 + k, ..]), batch.inputs.slice(s![.., 3 - k, 2..]));
        }
        assert_eq!(batch.mask.iter().filter(|&&m| m).count(), 2 * 4);
        assert!(batch.inputs.slice(s![.., .., 1]).iter().all(|&c| c == 0.0));
    }

    #[test]
    fn test_shrinking_max_length_clamps_min() {
        let config = ProblemConfig { kind: ProblemKind::ReverseRecall, ..ProblemConfig::default() };
        let mut problem = ReverseRecall::new(&config, &AppContext::with_seed(2)).unwrap();
        problem.set_max_length(0);
        assert_eq!(problem.max_length(), 1);
        assert_eq!(problem.min_length(), 1);
        assert_eq!(problem.generate_batch().seq_length, 1);
    }
}
