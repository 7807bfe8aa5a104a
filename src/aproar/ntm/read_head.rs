// src/aproar/ntm/read_head.rs ~=#######D]======A===r===c====M===o===o===n=====<Lord[NTM]Xyn>=====S===t===u===d===i===o===s======[R|$>

use super::*;

/// Reads every head's weighted sum of memory rows and concatenates them.
#[derive(Debug, Clone)]
pub struct ReadHead {
    num_heads: usize,
    memory_vector_size: usize,
}

impl ReadHead {
    pub fn new(num_heads: usize, memory_vector_size: usize) -> Self {
        ReadHead { num_heads, memory_vector_size }
    }

    pub fn read_size(&self) -> usize {
        self.num_heads * self.memory_vector_size
    }

    /// `weights` is `[batch, heads, addresses]`; returns `[batch, heads * content]`.
    pub fn read(&self, memory: &Memory, weights: &Array3<f32>) -> Result<Array2<f32>, NTMError> {
        let (batch, heads, addresses) = weights.dim();
        if batch != memory.batch_size() || heads != self.num_heads || addresses != memory.memory_size() {
            return Err(NTMError::shape(
                &[memory.batch_size(), self.num_heads, memory.memory_size()],
                weights.shape(),
            ));
        }

        let mut read_data = Array2::zeros((batch, self.read_size()));
        for b in 0..batch {
            for h in 0..heads {
                let read = memory.read(b, weights.slice(s![b, h, ..]))?;
                let start = h * self.memory_vector_size;
                read_data
                    .slice_mut(s![b, start..start + self.memory_vector_size])
                    .assign(&read);
            }
        }
        Ok(read_data)
    }
}
