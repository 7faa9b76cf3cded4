#[cfg(feature = "cli")]
pub mod cli;
pub mod store;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
pub fn run() -> Result<(), crate::error::AppError> {
    use crate::adapters::cli::{Args, execute};
    use crate::adapters::store::FileStore;
    use crate::session::Session;
    use tracing_subscriber::EnvFilter;

    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut session = Session::open(FileStore::new(&args.data_dir))?;
    tracing::debug!(data_dir = %args.data_dir.display(), "opened data directory");

    execute(&args, &mut session)
}
