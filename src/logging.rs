use std::env;
use tracing::debug;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub fn init_logger() -> impl Drop {
    // `TRACING_LEVEL` takes any EnvFilter directive; default `info`.
    let filter = env::var("TRACING_LEVEL").unwrap_or_else(|_| "info".to_string());
    let filter_layer = EnvFilter::new(filter);

    let log_file_path =
        env::var("LOG_FILE_PATH").unwrap_or_else(|_| "./logs/weigh-duper.log".to_string());

    let file_appender = tracing_appender::rolling::never("./", log_file_path);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stdout)
                .pretty()
                .with_file(false)
                .without_time()
                .with_ansi(true),
        )
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .with(filter_layer)
        .init();

    debug!("Tracing is configured for stdout and file logging.");

    guard
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;
    use tracing::info;

    #[test]
    fn test_init_logger_writes_file_layer() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("weigh-duper.log");
        env::set_var("LOG_FILE_PATH", &log_path);
        env::set_var("TRACING_LEVEL", "info");

        let guard = init_logger();
        info!("pruned 3 listings");
        drop(guard);

        let written = fs::read_to_string(&log_path).unwrap();
        assert!(written.contains("pruned 3 listings"));
        assert!(!written.contains('\x1b'));
    }
}
