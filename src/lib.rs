pub mod error;
pub mod config;
pub mod storage;
pub mod identity;
pub mod api;
pub mod views;
pub mod client;
pub mod cli;

pub use client::ClinicClient;
pub use error::{AppError, AppResult};
