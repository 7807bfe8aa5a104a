// src/aproar/ntm/interface.rs ~=#######D]======A===r===c====M===o===o===n=====<Lord[NTM]Xyn>=====S===t===u===d===i===o===s======[R|$>
use super::*;

/// Binds the read and write heads to a memory geometry.
#[derive(Debug, Clone)]
pub struct Interface {
    num_heads: usize,
    memory_size: usize,
    memory_vector_size: usize,
    read_head: ReadHead,
    write_head: WriteHead,
}

impl Interface {
    pub fn new(num_heads: usize, is_cam: bool, num_shift: usize, memory_size: usize, memory_vector_size: usize) -> Self {
        Interface {
            num_heads,
            memory_size,
            memory_vector_size,
            read_head: ReadHead::new(num_heads, memory_vector_size),
            write_head: WriteHead::new(memory_size, memory_vector_size, num_shift, is_cam),
        }
    }

    pub fn num_heads(&self) -> usize {
        self.num_heads
    }

    pub fn memory_size(&self) -> usize {
        self.memory_size
    }

    pub fn memory_vector_size(&self) -> usize {
        self.memory_vector_size
    }

    pub fn read_size(&self) -> usize {
        self.read_head.read_size()
    }

    pub fn update_size(&self) -> usize {
        self.num_heads * self.write_head.param_size()
    }

    pub fn read(&self, weights: &Array3<f32>, memory: &Memory) -> Result<Array2<f32>, NTMError> {
        self.read_head.read(memory, weights)
    }

    /// Computes every head's new weighting against the current memory, then
    /// applies the heads' erase/add writes in head order.
    pub fn update(&self, update_data: &Array2<f32>, weights: &Array3<f32>, mut memory: Memory) -> Result<(Array3<f32>, Memory), NTMError> {
        let batch = memory.batch_size();
        let expected = [batch, self.num_heads, self.memory_size];
        if weights.shape() != &expected[..] {
            return Err(NTMError::shape(&expected, weights.shape()));
        }
        if update_data.dim() != (batch, self.update_size()) {
            return Err(NTMError::shape(&[batch, self.update_size()], update_data.shape()));
        }

        let param_size = self.write_head.param_size();
        let mut new_weights = Array3::zeros(weights.raw_dim());
        let mut params = Vec::with_capacity(batch * self.num_heads);
        for b in 0..batch {
            for h in 0..self.num_heads {
                let raw = update_data.slice(s![b, h * param_size..(h + 1) * param_size]);
                let head_params = self.write_head.parse(raw)?;
                let w = self.write_head.get_weights(&head_params, weights.slice(s![b, h, ..]), memory.slots(b))?;
                new_weights.slice_mut(s![b, h, ..]).assign(&w);
                params.push(head_params);
            }
        }

        for b in 0..batch {
            for h in 0..self.num_heads {
                let head_params = &params[b * self.num_heads + h];
                memory.write(b, new_weights.slice(s![b, h, ..]), head_params.erase.view(), head_params.add.view())?;
            }
        }

        Ok((new_weights, memory))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn one_hot_weights(batch: usize, heads: usize, addresses: usize) -> Array3<f32> {
        let mut w = Array3::zeros((batch, heads, addresses));
        w.slice_mut(s![.., .., 0]).fill(1.0);
        w
    }

    #[test]
    fn test_sizes() {
        let interface = Interface::new(2, true, 3, 16, 5);
        assert_eq!(interface.read_size(), 10);
        assert_eq!(interface.update_size(), 2 * (3 * 5 + 3 + 3));
    }

    #[test]
    fn test_update_keeps_distributions_and_writes() {
        let interface = Interface::new(2, true, 3, 6, 4);
        let update_data = Array2::from_shape_fn((3, interface.update_size()), |(b, i)| ((b + i) % 7) as f32 * 0.4 - 1.0);
        let weights = one_hot_weights(3, 2, 6);
        let memory = Memory::new(3, 6, 4);

        let (new_weights, new_memory) = interface.update(&update_data, &weights, memory).unwrap();

        for row in new_weights.rows() {
            assert!(row.iter().all(|&x| x >= 0.0));
            assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-5);
        }
        assert!(new_memory.view().iter().any(|&x| x != 0.0));
    }

    #[test]
    fn test_update_rejects_bad_width() {
        let interface = Interface::new(1, false, 3, 4, 2);
        let weights = one_hot_weights(1, 1, 4);
        let result = interface.update(&Array2::zeros((1, 3)), &weights, Memory::new(1, 4, 2));
        assert!(matches!(result, Err(NTMError::ShapeMismatch { .. })));
    }
}
