use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use prism_formats::{
    cube_map::CubeMapHeader,
    environment::Environment,
    texture::{Sampler, TextureHeader},
};
use prism_log::info;
use prism_render::{BackendRegistry, Renderer, RendererSettings};
use prism_render_ibl::{IblData, MipData, BRDF_LUT_SAMPLER, ENVIRONMENT_SAMPLER};
use rayon::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the HDR panorama to bake.
    #[arg(short, long)]
    path: PathBuf,
    /// Backend to bake with. Defaults to the one named in the config, then `webgpu`.
    #[arg(short, long)]
    backend: Option<String>,
    /// RON file containing `RendererSettings`.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Directory the baked products are written to. Defaults to the directory of the panorama.
    #[arg(short, long)]
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let settings = match &args.config {
        Some(path) => RendererSettings::load(path)
            .with_context(|| format!("unable to load settings from {}", path.display()))?,
        None => RendererSettings::default(),
    };
    prism_log::init(settings.log_level);

    let registry = BackendRegistry::with_defaults();
    let backend = args.backend.as_deref().or(settings.backend.as_deref());
    let mut renderer = registry.create(backend, &settings)?;

    info!("loading {}", args.path.display());
    let environment = Environment::load(&args.path, settings.ibl.max_panorama_width)
        .with_context(|| format!("unable to load panorama {}", args.path.display()))?;

    let out = match args.out {
        Some(out) => out,
        None => args
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };
    let stem = match args.path.file_stem().and_then(|stem| stem.to_str()) {
        Some(stem) => stem.to_owned(),
        None => bail!("panorama path {} has no file name", args.path.display()),
    };

    bake(renderer.as_mut(), &environment, &out, &stem)
}

/// Preprocesses `environment` with `renderer` and writes every product under `out`.
fn bake(
    renderer: &mut dyn Renderer,
    environment: &Environment,
    out: &Path,
    stem: &str,
) -> Result<()> {
    renderer.update_environment(environment)?;
    let ibl = renderer.read_ibl()?;

    info!("saving to {}", out.display());
    save(&ibl, out, stem)?;
    info!("done");
    Ok(())
}

fn save(ibl: &IblData, out: &Path, stem: &str) -> Result<()> {
    let cubes = [
        (&ibl.environment, format!("{stem}.prism_cube")),
        (&ibl.irradiance, format!("{stem}.irr.prism_cube")),
        (&ibl.specular, format!("{stem}.spec.prism_cube")),
    ];

    cubes
        .par_iter()
        .try_for_each(|(mips, name)| save_cube_map(&out.join(name), mips))?;

    save_texture(
        &out.join(format!("{stem}.brdf.prism_tex")),
        &ibl.brdf_lut,
        BRDF_LUT_SAMPLER.into(),
    )
}

fn save_cube_map(path: &Path, mips: &[MipData]) -> Result<()> {
    let Some(first) = mips.first() else {
        bail!("{} has no mips", path.display());
    };

    let header = CubeMapHeader {
        size: first.width,
        mip_count: mips.len() as u32,
        format: first.format,
        sampler: ENVIRONMENT_SAMPLER.into(),
    };

    write_mips(path, &bincode::serialize(&header)?, mips)
}

fn save_texture(path: &Path, mips: &[MipData], sampler: Sampler) -> Result<()> {
    let Some(first) = mips.first() else {
        bail!("{} has no mips", path.display());
    };

    let header = TextureHeader {
        width: first.width,
        height: first.height,
        mip_count: mips.len() as u32,
        format: first.format,
        sampler,
    };

    write_mips(path, &bincode::serialize(&header)?, mips)
}

/// Writes `header` followed by one file per mip, named after the mip level.
fn write_mips(path: &Path, header: &[u8], mips: &[MipData]) -> Result<()> {
    std::fs::create_dir_all(path)?;
    std::fs::write(path.join("header"), header)?;

    mips.par_iter().enumerate().try_for_each(|(mip, data)| {
        std::fs::write(path.join(format!("{mip}")), &data.data)
            .with_context(|| format!("unable to write mip {mip} of {}", path.display()))
    })
}

#[cfg(test)]
mod tests;
