pub mod image_store;
pub mod media_storage;
pub mod memory_image_store;
pub mod persistent_image_store;
pub mod persistent_store;
