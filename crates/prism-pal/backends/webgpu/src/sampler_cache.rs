use api::texture::Sampler;
use rustc_hash::FxHashMap;

use crate::util::{to_wgpu_address_mode, to_wgpu_filter};

#[derive(Default)]
pub(crate) struct SamplerCache {
    samplers: FxHashMap<Sampler, wgpu::Sampler>,
}

impl SamplerCache {
    pub fn get(&mut self, device: &wgpu::Device, sampler: Sampler) -> wgpu::Sampler {
        self.samplers
            .entry(sampler)
            .or_insert_with(|| {
                device.create_sampler(&wgpu::SamplerDescriptor {
                    label: None,
                    address_mode_u: to_wgpu_address_mode(sampler.address_u),
                    address_mode_v: to_wgpu_address_mode(sampler.address_v),
                    address_mode_w: to_wgpu_address_mode(sampler.address_w),
                    mag_filter: to_wgpu_filter(sampler.mag_filter),
                    min_filter: to_wgpu_filter(sampler.min_filter),
                    mipmap_filter: to_wgpu_filter(sampler.mipmap_filter),
                    lod_min_clamp: sampler.min_lod.into_inner(),
                    lod_max_clamp: match sampler.max_lod {
                        Some(max_lod) => max_lod.into_inner(),
                        None => 32.0,
                    },
                    compare: None,
                    anisotropy_clamp: 1,
                    border_color: None,
                })
            })
            .clone()
    }
}
