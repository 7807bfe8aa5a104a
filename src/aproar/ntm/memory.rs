// src/aproar/ntm/memory.rs ~=#######D]======A===r===c====M===o===o===n=====<Lord[NTM]Xyn>=====S===t===u===d===i===o===s======[R|$>

use ndarray::{Array1, Array3, ArrayView1, ArrayView2, Axis};
use crate::omnixtracker::omnixerror::NTMError;

/// Memory bank of shape `[batch, addresses, content]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Memory {
    memory: Array3<f32>,
}

impl Memory {
    pub fn new(batch_size: usize, memory_size: usize, memory_vector_size: usize) -> Self {
        Memory {
            memory: Array3::zeros((batch_size, memory_size, memory_vector_size)),
        }
    }

    pub fn from_array(memory: Array3<f32>) -> Self {
        Memory { memory }
    }

    pub fn batch_size(&self) -> usize {
        self.memory.len_of(Axis(0))
    }

    pub fn memory_size(&self) -> usize {
        self.memory.len_of(Axis(1))
    }

    pub fn memory_vector_size(&self) -> usize {
        self.memory.len_of(Axis(2))
    }

    pub fn view(&self) -> &Array3<f32> {
        &self.memory
    }

    /// Slots of one batch element.
    pub fn slots(&self, batch: usize) -> ArrayView2<f32> {
        self.memory.index_axis(Axis(0), batch)
    }

    /// `memory[batch]^T · weights`.
    pub fn read(&self, batch: usize, weights: ArrayView1<f32>) -> Result<Array1<f32>, NTMError> {
        self.check_batch(batch)?;
        if weights.len() != self.memory_size() {
            return Err(NTMError::shape(&[self.memory_size()], &[weights.len()]));
        }
        Ok(self.slots(batch).t().dot(&weights))
    }

    /// Erase-then-add: `m = m * (1 - w ⊗ e) + w ⊗ a` for one batch element.
    pub fn write(&mut self, batch: usize, weights: ArrayView1<f32>, erase: ArrayView1<f32>, add: ArrayView1<f32>) -> Result<(), NTMError> {
        self.check_batch(batch)?;
        let (slots, width) = (self.memory_size(), self.memory_vector_size());
        if weights.len() != slots || erase.len() != width || add.len() != width {
            return Err(NTMError::shape(&[slots, width, width], &[weights.len(), erase.len(), add.len()]));
        }

        let w = weights.insert_axis(Axis(1));
        let erase_term = &w * &erase.insert_axis(Axis(0));
        let add_term = &w * &add.insert_axis(Axis(0));

        let mut slab = self.memory.index_axis_mut(Axis(0), batch);
        let updated = &slab * &(1.0 - &erase_term) + &add_term;
        slab.assign(&updated);
        Ok(())
    }

    fn check_batch(&self, batch: usize) -> Result<(), NTMError> {
        if batch >= self.batch_size() {
            return Err(NTMError::MemoryError(format!(
                "batch index {} out of range for memory of batch size {}",
                batch,
                self.batch_size()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;

    fn random_memory() -> Memory {
        Memory::from_array(Array3::random((2, 5, 3), Uniform::new(-1.0, 1.0)))
    }

    #[test]
    fn test_one_hot_read_returns_row() {
        let memory = random_memory();
        for k in 0..5 {
            let mut w = Array1::zeros(5);
            w[k] = 1.0;
            let read = memory.read(1, w.view()).unwrap();
            assert_eq!(read, memory.slots(1).row(k).to_owned());
        }
    }

    #[test]
    fn test_zero_erase_and_add_leave_memory_unchanged() {
        let mut memory = random_memory();
        let before = memory.clone();
        let w = array![0.1, 0.2, 0.3, 0.2, 0.2];
        memory.write(0, w.view(), Array1::zeros(3).view(), Array1::zeros(3).view()).unwrap();
        assert_eq!(memory, before);
    }

    #[test]
    fn test_full_erase_then_add_overwrites_slot() {
        let mut memory = random_memory();
        let untouched = memory.slots(1).to_owned();
        let w = array![0.0, 0.0, 1.0, 0.0, 0.0];
        let add = array![0.5, -0.5, 2.0];
        memory.write(0, w.view(), Array1::ones(3).view(), add.view()).unwrap();

        let slots = memory.slots(0);
        for d in 0..3 {
            assert_abs_diff_eq!(slots[[2, d]], add[d], epsilon = 1e-6);
        }
        assert_eq!(memory.slots(1).to_owned(), untouched);
    }

    #[test]
    fn test_write_shape_mismatch() {
        let mut memory = Memory::new(1, 4, 2);
        let result = memory.write(0, Array1::zeros(3).view(), Array1::zeros(2).view(), Array1::zeros(2).view());
        assert!(matches!(result, Err(NTMError::ShapeMismatch { .. })));
        assert!(matches!(memory.read(3, Array1::zeros(4).view()), Err(NTMError::MemoryError(_))));
        assert_eq!(memory.view(), &Array3::<f32>::zeros((1, 4, 2)));
    }
}
