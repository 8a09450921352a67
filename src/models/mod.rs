pub mod category;
pub mod image;
pub mod percentage;

pub use category::*;
pub use image::*;
pub use percentage::*;
