pub mod config;
pub mod filter;
pub mod fixture;
pub mod http;
