pub mod analysis;
pub mod cache;
pub mod config;
pub mod dataset;
pub mod demo;
pub mod export;
pub mod outcome;
pub mod provider;
pub mod state;
