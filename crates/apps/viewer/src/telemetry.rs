use tracing_subscriber::EnvFilter;

/// Installs the global `fmt` subscriber filtered by `RUST_LOG`. Returns
/// `false` when the host already installed one.
pub fn init_tracing() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .is_ok()
}
