// src/problems/serial_recall.rs ~=#######D]======A===r===c====M===o===o===n=====<Lord[PROBLEMS]Xyn>=====S===t===u===d===i===o===s======[R|$>

use super::*;
use crate::constants::{SERIAL_RECALL_MIN_CONTROL_BITS, SERIAL_RECALL_MIN_DATA_BITS};

/// Copy task without start/stop markers: control bit 0 is raised while an
/// item has to be memorised and dropped while it has to be recalled.
///
/// Layout for sequence length `L` (total `2L` steps): store on `0..L`,
/// recall on `L..2L`.
#[derive(Debug, Clone)]
pub struct SerialRecall {
    sampler: SequenceSampler,
}

impl SerialRecall {
    pub const NAME: &'static str = "serial_recall";

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

/// Shared by the simplified serial and reverse recall tasks, which differ
/// only in the order the recalled items are expected.
pub(crate) fn store_then_recall(sampler: &mut SequenceSampler, reverse: bool) -> DataTuple {
    let seq_length = sampler.draw_seq_length();
    let bit_seq = sampler.generate_bit_sequence(seq_length);
    let config = sampler.config();
    let (control_bits, batch_size) = (config.control_bits, config.batch_size);

    let (mut inputs, mut targets) = sampler.empty_batch(2 * seq_length);
    set_control(&mut inputs, 0..seq_length, &marker(control_bits, 0));
    set_data(&mut inputs, 0, control_bits, &bit_seq);

    let recalled = if reverse { reverse_time(&bit_seq) } else { bit_seq };
    set_target(&mut targets, seq_length, &recalled);

    DataTuple {
        inputs,
        targets,
        mask: mask_spans(batch_size, 2 * seq_length, &[seq_length..2 * seq_length]),
        seq_length,
    }
}

impl BatchGenerator for SerialRecall {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn generate_batch(&mut self) -> DataTuple {
        store_then_recall(&mut self.sampler, false)
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

    fn config() -> ProblemConfig {
        ProblemConfig {
            kind: ProblemKind::SerialRecall,
            batch_size: 3,
            control_bits: 1,
            data_bits: 8,
            min_sequence_length: 1,
            max_sequence_length: 10,
            bias: 0.5,
            randomize_control_lines: false,
        }
    }

    #[test]
    fn test_layout() {
        let mut problem = SerialRecall::new(&config(), &AppContext::with_seed(1)).unwrap();
        let batch = problem.generate_batch();
        let l = batch.seq_length;
        assert!((1..=10).contains(&l));
        assert_eq!(batch.inputs.dim(), (3, 2 * l, 9));
        assert_eq!(batch.targets.dim(), (3, 2 * l, 8));

        for t in 0..2 * l {
            let storing = t < l;
            assert!(batch.inputs.slice(s![.., t, 0]).iter().all(|&c| c == if storing { 1.0 } else { 0.0 }));
            assert!(batch.mask.column(t).iter().all(|&m| m == !storing));
        }
        assert_eq!(batch.targets.slice(s![.., l.., ..]), batch.inputs.slice(s![.., ..l, 1..]));
        assert!(batch.targets.slice(s![.., ..l, ..]).iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_minimum_bits() {
        let err = SerialRecall::new(&ProblemConfig { data_bits: 1, ..config() }, &AppContext::with_seed(1)).unwrap_err();
        assert_eq!(
            err,
            NTMError::InsufficientBits { problem: "serial_recall", kind: "data", required: 2, actual: 1 }
        );
        assert!(SerialRecall::new(&ProblemConfig { control_bits: 0, ..config() }, &AppContext::with_seed(1)).is_err());
    }
}
