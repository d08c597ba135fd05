// src/infrastructure/mod.rs
pub mod blob_dir;
pub mod json_store;
pub mod renderer;

pub use blob_dir::DirectoryBlobStore;
pub use json_store::JsonRecordStore;
pub use renderer::PageRenderer;
