pub mod log {
    pub use prism_log::*;
}

pub mod math {
    pub use prism_math::*;
}

pub mod pal {
    pub use prism_pal::*;
}

pub mod formats {
    pub use prism_formats::*;
}

pub mod ibl {
    pub use prism_render_ibl::*;
}

pub mod render {
    pub mod prelude {
        pub use prism_pal::prelude::*;
        pub use prism_render::*;
    }

    pub use prism_render::*;
}
