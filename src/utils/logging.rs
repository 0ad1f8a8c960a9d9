use tracing_subscriber::{fmt, EnvFilter};

pub fn init() {
    // RUST_LOG wins; otherwise info for everything
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
