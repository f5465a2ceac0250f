#![forbid(unsafe_code)]

pub mod csv_io;
pub mod json;
pub mod repository;

pub use repository::{InMemoryRepository, SessionRepository, Storage, StorageError};
