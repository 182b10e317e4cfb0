mod cli;
mod command;
mod infra;
mod routes;
mod server;

use compliance_portal::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
