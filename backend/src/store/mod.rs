// src/store/mod.rs

//! File-backed entity storage: one JSON array per collection, fully
//! rewritten on every write.

mod collections;
mod error;
mod repository;

pub use collections::Collections;
pub use error::StoreError;
pub use repository::Repository;
