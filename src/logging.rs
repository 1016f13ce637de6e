//! Process-wide logging setup.
use env_logger::Env;

/// Initialize `env_logger` for this process, logging at `info` unless `RUST_LOG` says
/// otherwise.  Only the first call has any effect.
pub fn init() {
    let env = Env::default().default_filter_or("info");
    if env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init()
        .is_err()
    {
        log::debug!("logging already initialized");
    }
}
