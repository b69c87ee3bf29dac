use once_cell::sync::Lazy;
pub use slog::*;
use std::sync::Mutex;

static WORKER: Mutex<Option<slog_async::AsyncGuard>> = Mutex::new(None);

fn wrap<D: Drain<Err = Never, Ok = ()> + Send + 'static>(
    drain: D,
) -> IgnoreResult<slog_async::Async> {
    let (drain, guard) = slog_async::Async::new(slog_envlogger::new(drain)).build_with_guard();
    if let Ok(mut worker) = WORKER.lock() {
        *worker = Some(guard);
    }
    drain.ignore_res()
}

/// Writes out everything queued so far and stops the logging worker.
/// Records logged afterwards are discarded.
pub fn flush() {
    let guard = WORKER.lock().ok().and_then(|mut worker| worker.take());
    drop(guard);
}

fn build(format: &str) -> Logger {
    let mk_term = || {
        slog_term::FullFormat::new(slog_term::TermDecorator::new().stderr().build())
            .build()
            .fuse()
    };

    let mk_json = || slog_json::Json::default(std::io::stdout()).fuse();

    let drain = match format {
        "json" => wrap(mk_json()),
        _ => wrap(mk_term()),
    };

    Logger::root(
        drain,
        o!(
            "app" => env!("CARGO_PKG_NAME"),
            "version" => env!("CARGO_PKG_VERSION"),
        ),
    )
}

/// Root logger. `LOG_FORMAT` wins over the `log_format` config entry.
pub static DEFAULT: Lazy<Logger> = Lazy::new(|| {
    let format = std::env::var("LOG_FORMAT")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| crate::config::CONFIG.log_format.clone());
    build(format.trim())
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flush_is_idempotent_and_later_records_are_dropped() {
        let log = DEFAULT.new(o!("function" => "test_flush"));
        info!(log, "before flush");
        flush();
        assert!(WORKER.lock().unwrap().is_none());
        flush();
        info!(log, "after flush");
    }
}
