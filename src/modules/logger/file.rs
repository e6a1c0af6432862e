use crate::modules::logger::LocalTimer;
use crate::modules::settings::cli::Settings;
use std::sync::OnceLock;
use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;

pub static LOG_WORKER_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

pub fn setup_file_logger(settings: &Settings, level: Level) -> Result<(), String> {
    let (server_nonb, server_guard) = server_log_writer(settings)?;
    LOG_WORKER_GUARD
        .set(server_guard)
        .map_err(|_| "file logger already initialized".to_string())?;

    let server_layer = fmt::layer()
        .with_timer(LocalTimer)
        .with_ansi(settings.mailer_ansi_logs)
        .with_level(true)
        .with_writer(server_nonb)
        .with_target(true);

    let subscriber = tracing_subscriber::registry()
        .with(LevelFilter::from_level(level))
        .with(server_layer);

    tracing::subscriber::set_global_default(subscriber).map_err(|e| e.to_string())
}

fn server_log_writer(settings: &Settings) -> Result<(NonBlocking, WorkerGuard), String> {
    let rolling = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("mailer")
        .max_log_files(settings.mailer_max_log_files)
        .build(&settings.mailer_log_dir)
        .map_err(|e| format!("failed to initialize rolling file appender: {}", e))?;
    Ok(tracing_appender::non_blocking(rolling))
}
