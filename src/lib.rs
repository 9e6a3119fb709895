pub mod config;
pub mod error;
pub mod inventory;
pub mod logging;
pub mod parser;
pub mod report;
pub mod scanner;
pub mod workspace;
