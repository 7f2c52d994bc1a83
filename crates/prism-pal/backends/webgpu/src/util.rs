use api::{
    descriptor_set::DescriptorType,
    types::{Filter, Format, SamplerAddressMode, ShaderStage, TextureUsage, ViewDimension},
};

#[inline(always)]
pub(crate) fn to_wgpu_format(format: Format) -> wgpu::TextureFormat {
    match format {
        Format::Rgba8Unorm => wgpu::TextureFormat::Rgba8Unorm,
        Format::Rgba8Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
        Format::Rgba16SFloat => wgpu::TextureFormat::Rgba16Float,
        Format::Rgba32SFloat => wgpu::TextureFormat::Rgba32Float,
    }
}

#[inline(always)]
pub(crate) fn to_wgpu_view_dimension(dimension: ViewDimension) -> wgpu::TextureViewDimension {
    match dimension {
        ViewDimension::D2 => wgpu::TextureViewDimension::D2,
        ViewDimension::D2Array => wgpu::TextureViewDimension::D2Array,
        ViewDimension::Cube => wgpu::TextureViewDimension::Cube,
    }
}

#[inline(always)]
pub(crate) fn to_wgpu_filter(filter: Filter) -> wgpu::FilterMode {
    match filter {
        Filter::Nearest => wgpu::FilterMode::Nearest,
        Filter::Linear => wgpu::FilterMode::Linear,
    }
}

#[inline(always)]
pub(crate) fn to_wgpu_address_mode(mode: SamplerAddressMode) -> wgpu::AddressMode {
    match mode {
        SamplerAddressMode::Repeat => wgpu::AddressMode::Repeat,
        SamplerAddressMode::MirroredRepeat => wgpu::AddressMode::MirrorRepeat,
        SamplerAddressMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
    }
}

#[inline(always)]
pub(crate) fn to_wgpu_shader_stages(stage: ShaderStage) -> wgpu::ShaderStages {
    match stage {
        ShaderStage::AllGraphics => wgpu::ShaderStages::VERTEX_FRAGMENT,
        ShaderStage::Vertex => wgpu::ShaderStages::VERTEX,
        ShaderStage::Fragment => wgpu::ShaderStages::FRAGMENT,
        ShaderStage::Compute => wgpu::ShaderStages::COMPUTE,
    }
}

/// Every texture may be read back or uploaded to, regardless of the requested usage.
pub(crate) fn to_wgpu_texture_usage(usage: TextureUsage) -> wgpu::TextureUsages {
    let mut out = wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::COPY_DST;
    if usage.contains(TextureUsage::SAMPLED) {
        out |= wgpu::TextureUsages::TEXTURE_BINDING;
    }
    if usage.contains(TextureUsage::STORAGE) {
        out |= wgpu::TextureUsages::STORAGE_BINDING;
    }
    if usage.contains(TextureUsage::COLOR_ATTACHMENT) {
        out |= wgpu::TextureUsages::RENDER_ATTACHMENT;
    }
    out
}

pub(crate) fn to_wgpu_binding_type(ty: DescriptorType) -> wgpu::BindingType {
    match ty {
        DescriptorType::Texture {
            dimension,
            filterable,
        } => wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable },
            view_dimension: to_wgpu_view_dimension(dimension),
            multisampled: false,
        },
        DescriptorType::Sampler { filtering } => wgpu::BindingType::Sampler(if filtering {
            wgpu::SamplerBindingType::Filtering
        } else {
            wgpu::SamplerBindingType::NonFiltering
        }),
        DescriptorType::UniformBuffer => wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        DescriptorType::StorageImage { format, dimension } => wgpu::BindingType::StorageTexture {
            access: wgpu::StorageTextureAccess::WriteOnly,
            format: to_wgpu_format(format),
            view_dimension: to_wgpu_view_dimension(dimension),
        },
    }
}

#[inline(always)]
pub(crate) fn align_up(value: u64, alignment: u64) -> u64 {
    value.div_ceil(alignment) * alignment
}
