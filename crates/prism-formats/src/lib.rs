pub mod cube_map;
pub mod environment;
pub mod panorama;
pub mod texture;

#[cfg(test)]
mod tests;
