pub mod image_library;
pub mod processed_set;
