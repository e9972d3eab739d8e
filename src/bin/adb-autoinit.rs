use clap::Parser;
use log::{error, info};
use adb_autoinit::{init_logging, run};
use adb_autoinit::cli::Args;
use adb_autoinit::error::AppRunError;

fn main() -> Result<(), AppRunError> {
    let args = Args::parse();

    init_logging(args.verbose);
    info!(concat!("adb-autoinit ", env!("CARGO_PKG_VERSION")));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|source| AppRunError::Runtime { source })?;

    match runtime.block_on(run(args)) {
        Err(err) => {
            error!("Unexpected error: {}", err);
            Err(err)
        },
        Ok(_) => Ok(()),
    }
}
