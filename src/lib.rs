use std::env;
use log::{info, warn};
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::adb::client::AdbClient;
use crate::cli::Args;
use crate::config::io::{ConfigIO, InstanceLocker};
use crate::dispatch::{run_tracker, Dispatcher};
use crate::error::AppRunError;
use crate::init::initializer::Initializer;

pub mod adb;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod init;

#[cfg(all(test, unix))]
mod testing;

pub fn init_logging(verbose: bool) {
    let level = if verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info };

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                humantime::format_rfc3339(std::time::SystemTime::now()),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr());

    if let Ok(log_file) = env::var("LOG_FILE") {
        dispatch = dispatch.chain(
            fern::log_file(log_file).expect("Failed to open LOG_FILE")
        );
    }

    dispatch.apply().expect("Failed to initialize logger");
}

pub async fn run(args: Args) -> Result<(), AppRunError> {
    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            ctrl_c_cancel.cancel();
        }
    });

    run_until_cancelled(args, cancel).await
}

/// Tracks devices until adb stops reporting, then waits for the init tools that are still
/// running. When `cancel` fires first, returns without waiting for them.
pub async fn run_until_cancelled(args: Args, cancel: CancellationToken) -> Result<(), AppRunError> {
    let mut locker = InstanceLocker::open(args.lock_dir.as_deref())?;
    // held until tracking stops
    let _lock = locker.lock()?;

    let config_io = ConfigIO::new(args.config.clone())?;
    let config = config_io.read().await?.with_overrides(args.adb.clone(), args.server.clone());

    let adb = AdbClient::discover(config.adb_path.as_deref())?;
    let mut tracker = adb.track_devices()?;

    info!("tracking device");
    if let Some(server) = &config.server {
        info!("server {}", server);
    }

    let dispatcher = Dispatcher::new(Initializer::new(adb, config));
    let running = run_tracker(&mut tracker, &dispatcher, cancel.clone()).await;

    // adb went away on its own, let the init tools that are still running finish
    if !cancel.is_cancelled() {
        for handle in running {
            if let Err(err) = handle.await {
                warn!("Initialization task failed: {}", err);
            }
        }
    }

    Ok(())
}
