//! Interactive mode for the server.
//!
//! Prompts the user for the dataset path, bind address and port before
//! starting the server.

use std::path::PathBuf;

use dialoguer::{Confirm, Input};

use crate::ServerConfig;

/// Runs the server in interactive mode, prompting for configuration.
///
/// Defaults come from [`ServerConfig::from_env`]; the answers are passed
/// straight to [`super::run_server`].
///
/// # Errors
///
/// Returns an `std::io::Result` error if the underlying server fails to
/// start.
#[allow(clippy::future_not_send)]
pub async fn run() -> std::io::Result<()> {
    println!("Crime EDA Dashboard Server");
    println!();

    let defaults = ServerConfig::from_env();
    let default_dataset = defaults.dataset_path.display().to_string();

    let dataset_path: String = Input::new()
        .with_prompt("Dataset CSV")
        .default(default_dataset.clone())
        .interact_text()
        .unwrap_or(default_dataset);

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default(defaults.bind_addr.clone())
        .interact_text()
        .unwrap_or(defaults.bind_addr);

    let port: u16 = Input::new()
        .with_prompt("Port")
        .default(defaults.port)
        .interact_text()
        .unwrap_or(defaults.port);

    if !Confirm::new()
        .with_prompt(format!("Start server on {bind_addr}:{port}?"))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::run_server(ServerConfig {
        dataset_path: PathBuf::from(dataset_path),
        bind_addr,
        port,
    })
    .await
}
