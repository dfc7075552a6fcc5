pub mod components;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod shutdown;
pub mod startup;
pub mod utils;
pub mod web;
