#![forbid(unsafe_code)]

pub mod aggregate;
pub mod metrics;
pub mod model;
pub mod sort;
pub mod store;

pub use model::{FishError, FishName, FishRecord, Session, UNSPECIFIED};
pub use store::{SessionStore, StoreError};
