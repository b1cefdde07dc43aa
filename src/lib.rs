pub mod build;
pub mod error;
pub mod options;
pub mod package;
pub mod patch;
pub mod platform;
pub mod recipe;
pub mod strategy;
