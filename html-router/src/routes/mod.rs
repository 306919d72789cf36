pub mod gallery;
pub mod index;
