pub struct Buffer {
    pub(crate) buffer: wgpu::Buffer,
    /// Size of a single array element.
    pub(crate) size: u64,
    /// Distance between array elements. Aligned so any element may be bound as a uniform.
    pub(crate) stride: u64,
}

impl Buffer {
    #[inline(always)]
    pub(crate) fn offset(&self, array_element: usize) -> u64 {
        self.stride * array_element as u64
    }
}
