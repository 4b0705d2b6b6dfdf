//! Logger setup for binaries and tests embedding the bridge.
//!
//! The library itself only emits through the `log` facade. With the `debug`
//! feature, [`init_logging`] installs `env_logger`, honoring `RUST_LOG` and
//! defaulting to `info`.

/// Installs the logger. Calling it more than once is harmless.
#[cfg(feature = "debug")]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

#[cfg(not(feature = "debug"))]
pub fn init_logging() {}
