//! Diagnostic logging for the language server.
//!
//! stdout belongs to the JSON-RPC stream, so every log line goes to stderr,
//! where editors surface it in the server's output panel. The configured
//! level applies to the build and marker pipeline. The `async_lsp`
//! transport logs every frame at debug level, so it stays at `warn` unless
//! the level is `trace` or `error`.

use tracing_subscriber::EnvFilter;

use crate::config::{LogLevel, ServerConfig};

fn filter_directives(level: LogLevel) -> String {
    let transport = match level {
        LogLevel::Trace | LogLevel::Error => level.as_filter_str(),
        LogLevel::Debug | LogLevel::Info | LogLevel::Warn => "warn",
    };
    format!("{},async_lsp={transport}", level.as_filter_str())
}

/// Install the stderr subscriber for `config`.
///
/// The CLI `--log-level` wins over `CUKE_GLUE_LSP_LOG_LEVEL` because it is
/// applied to `config` before this is called. Only the first call installs
/// a subscriber; later ones are ignored.
pub fn init_logging(config: &ServerConfig) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter_directives(config.log_level)))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("logging already initialised");
    }
}
