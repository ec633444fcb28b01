pub mod color;
pub mod generator;
pub mod image_types;
pub mod profiles;
