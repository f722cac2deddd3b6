pub mod generation;
pub mod memory;
pub mod repository;
