pub mod command;
pub mod config;
pub mod context_menu;
pub mod hub;
pub mod r#loop;
pub mod mirror;
pub mod notification;
pub mod recovery;
pub mod router;
pub mod store;
pub mod view_pool;
pub mod warning;
