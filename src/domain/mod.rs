pub mod entries;
pub mod models;
pub mod repository;
pub mod surface;
