pub mod classify;
pub mod config;
pub mod measure;
pub mod pose;
