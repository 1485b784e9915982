//! Storage backends that live entirely in process

pub mod memory;

pub use memory::InMemoryRepositoryProvider;
