//! Varray Runtime
//!
//! Binary that prints the widening lattice and smoke-runs the array facade

mod settings;
mod smoke;

use anyhow::Result;
use settings::RuntimeSettings;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let settings = match std::env::args().nth(1) {
        Some(path) => RuntimeSettings::load(Path::new(&path))?,
        None => RuntimeSettings::default(),
    };

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Varray v{}", varray_core::VERSION);

    if settings.report_lattice {
        print!("{}", smoke::render_lattice());
    }

    smoke::run(&settings.smoke)?;
    tracing::info!("Smoke run completed");

    Ok(())
}
