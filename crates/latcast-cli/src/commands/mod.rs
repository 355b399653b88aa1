//! Command implementations for the latcast CLI

pub mod config;
pub mod models;
pub mod observations;
pub mod predict;
