//! # Garbage Panda - Entry Point
//! src/main.rs
//!
//! Punto de entrada del servidor: lee la configuración, registra los
//! handlers de ejemplo y atiende hasta recibir Ctrl+C.

use garbage_panda::commands;
use garbage_panda::config::Config;
use garbage_panda::error::Result;
use garbage_panda::router::RouterBuilder;
use garbage_panda::server::Server;
use tracing::{error, info};

fn main() {
    let config = Config::new();

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_target(false)
        .init();

    if let Err(e) = run(config) {
        error!("Error fatal: {}", e);
        std::process::exit(1);
    }
}

fn run(config: Config) -> Result<()> {
    config.validate()?;
    config.print_summary();

    let mut builder = RouterBuilder::new();
    commands::register_defaults(&mut builder, &config)?;

    let server = Server::bind(&config, builder.build())?;

    // Ctrl+C: dejar de aceptar y esperar a los workers
    let handle = server.shutdown_handle();
    ctrlc::set_handler(move || handle.shutdown())?;

    info!("Presiona Ctrl+C para detener el servidor");
    server.run();

    Ok(())
}
