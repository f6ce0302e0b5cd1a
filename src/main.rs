use orm_forge::OrmError;
use orm_forge::{cli, ui};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match cli::main().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ui::print_error(&format!("Error: {e:#}"));
            // Input problems exit with 2 so scripts can tell them apart
            match e.downcast_ref::<OrmError>() {
                Some(err) if err.is_client_error() => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}
