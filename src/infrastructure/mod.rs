pub mod headless;
pub mod json_store;
