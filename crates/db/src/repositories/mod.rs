//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async queries that
//! accept `&MySqlPool` as the first argument.

pub mod character_repo;

pub use character_repo::CharacterRepo;
