use api::types::QueueType;
use bytemuck::Pod;

/// Everything the backend has been asked to do, in submission order.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    Submit {
        queue: QueueType,
        debug_name: Option<String>,
    },
    Dispatch(DispatchRecord),
    Draw(DrawRecord),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRecord {
    pub pipeline: Option<String>,
    pub pass: Option<String>,
    pub groups: (u32, u32, u32),
    /// Contents of every bound uniform buffer at the time of the dispatch.
    pub uniforms: Vec<UniformRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    pub pipeline: Option<String>,
    pub pass: Option<String>,
    pub target_dims: (u32, u32),
    pub vertex_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UniformRecord {
    pub set: usize,
    pub binding: u32,
    pub data: Vec<u8>,
}

impl DispatchRecord {
    /// Decodes the uniform bound at `set` and `binding` during the dispatch.
    pub fn uniform<T: Pod>(&self, set: usize, binding: u32) -> Option<T> {
        self.uniforms
            .iter()
            .find(|u| u.set == set && u.binding == binding)
            .map(|u| bytemuck::pod_read_unaligned(&u.data[..std::mem::size_of::<T>()]))
    }
}

impl TraceEvent {
    pub fn as_dispatch(&self) -> Option<&DispatchRecord> {
        match self {
            TraceEvent::Dispatch(record) => Some(record),
            _ => None,
        }
    }
}
