//! HTTP service and command-line entry points.

mod cli;
mod commands;
pub mod infra;
pub mod routes;
mod server;

use crate::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
