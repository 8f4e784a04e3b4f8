mod mcp;

pub use mcp::{GetMaxPriceParams, McpServer};

/// Initializes stderr logging. Verbosity comes from `LOG_LEVEL`
/// (error, warn, info or debug), defaulting to `info`.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("LOG_LEVEL", "info"))
        .target(env_logger::Target::Stderr)
        .write_style(env_logger::WriteStyle::Never)
        .init();
}
