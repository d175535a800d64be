pub mod bootstrap;
#[path = "config/mod.rs"]
pub mod config_mod;
pub use config_mod as config;
pub mod db;
pub mod storage;
pub mod tabular;
