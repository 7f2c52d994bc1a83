use std::sync::{Arc, RwLock};

use bytemuck::Pod;

#[derive(Clone)]
pub struct Buffer {
    pub(crate) elements: Arc<Vec<RwLock<Vec<u8>>>>,
}

impl Buffer {
    pub(crate) fn new(size: u64, array_elements: usize) -> Self {
        Self {
            elements: Arc::new(
                (0..array_elements)
                    .map(|_| RwLock::new(vec![0; size as usize]))
                    .collect(),
            ),
        }
    }

    pub(crate) fn write(&self, array_element: usize, data: &[u8]) {
        let mut element = self.elements[array_element].write().unwrap();
        element[..data.len()].copy_from_slice(data);
    }

    pub(crate) fn bytes(&self, array_element: usize) -> Vec<u8> {
        self.elements[array_element].read().unwrap().clone()
    }

    /// Reads a value from the start of an array element.
    pub fn read<T: Pod>(&self, array_element: usize) -> T {
        let element = self.elements[array_element].read().unwrap();
        bytemuck::pod_read_unaligned(&element[..std::mem::size_of::<T>()])
    }
}
