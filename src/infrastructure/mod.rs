// src/infrastructure/mod.rs
pub mod config;
pub mod graphql;
pub mod renderer;
pub mod storage;

pub use config::Config;
pub use graphql::GraphQlNoteRepository;
pub use storage::HttpBlobStore;
