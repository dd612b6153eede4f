pub mod accounts;
pub mod config;
pub mod error;
pub mod memory;
pub mod seeders;
pub mod shifts;
pub mod state;
