pub mod image_inspector;

pub use image_inspector::ImageCrateInspector;
