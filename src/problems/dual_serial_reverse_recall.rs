// src/problems/dual_serial_reverse_recall.rs ~=#######D]======A===r===c====M===o===o===n=====<Lord[PROBLEMS]Xyn>=====S===t===u===d===i===o===s======[R|$>

use super::*;
use crate::constants::{DUAL_RECALL_MIN_CONTROL_BITS, DUAL_RECALL_MIN_DATA_BITS};

/// Store a sequence once, then recall it forwards and backwards.
///
/// Three one-hot markers open the phases: bit 0 starts storing, bit 1 starts
/// the serial recall and bit 2 the reverse recall. While recalling, a command
/// line (`ctrl_aux`) is held high. For sequence length `L` the layout is:
///
/// | step            | control        | data | target          |
/// |-----------------|----------------|------|-----------------|
/// | `0`             | marker 0       |      |                 |
/// | `1..=L`         |                | bits |                 |
/// | `L+1`           | marker 1       |      |                 |
/// | `L+2..2L+2`     | `ctrl_aux`     |      | bits            |
/// | `2L+2`          | marker 2       |      |                 |
/// | `2L+3..3L+3`    | `ctrl_aux`     |      | reversed bits   |
#[derive(Debug, Clone)]
pub struct DualSerialReverseRecall {
    sampler: SequenceSampler,
}

impl DualSerialReverseRecall {
    pub const NAME: &'static str = "dual_serial_reverse_recall";

    pub fn new(config: &ProblemConfig, context: &AppContext) -> Result<Self, NTMError> {
        let sampler = SequenceSampler::new(
            Self::NAME,
            config,
            context,
            DUAL_RECALL_MIN_CONTROL_BITS,
            DUAL_RECALL_MIN_DATA_BITS,
        )?;
        Ok(Self { sampler })
    }

    /// Bit 3 with exactly four control bits; otherwise the last bit, or a
    /// random bit in `[3, control_bits)` when control lines are randomised.
    fn command_line_bit(&mut self) -> usize {
        let (control_bits, randomize) = {
            let config = self.sampler.config();
            (config.control_bits, config.randomize_control_lines)
        };
        if control_bits == DUAL_RECALL_MIN_CONTROL_BITS {
            3
        } else if randomize {
            self.sampler.rng().gen_range(3..control_bits)
        } else {
            control_bits - 1
        }
    }
}

impl BatchGenerator for DualSerialReverseRecall {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn generate_batch(&mut self) -> DataTuple {
        let control_bits = self.sampler.config().control_bits;
        let batch_size = self.sampler.config().batch_size;
        let ctrl_aux = marker(control_bits, self.command_line_bit());

        let l = self.sampler.draw_seq_length();
        let bit_seq = self.sampler.generate_bit_sequence(l);
        let time_steps = 3 * l + 3;
        let serial = l + 2..2 * l + 2;
        let reverse = 2 * l + 3..3 * l + 3;

        let (mut inputs, mut targets) = self.sampler.empty_batch(time_steps);
        set_control(&mut inputs, 0..1, &marker(control_bits, 0));
        set_data(&mut inputs, 1, control_bits, &bit_seq);
        set_control(&mut inputs, l + 1..l + 2, &marker(control_bits, 1));
        set_control(&mut inputs, serial.clone(), &ctrl_aux);
        set_control(&mut inputs, 2 * l + 2..2 * l + 3, &marker(control_bits, 2));
        set_control(&mut inputs, reverse.clone(), &ctrl_aux);

        set_target(&mut targets, serial.start, &bit_seq);
        set_target(&mut targets, reverse.start, &reverse_time(&bit_seq));

        DataTuple {
            inputs,
            targets,
            mask: mask_spans(batch_size, time_steps, &[serial, reverse]),
            seq_length: l,
        }
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
