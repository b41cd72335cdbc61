use std::io::stderr;
use std::sync::LazyLock;

use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::precomputed::move_tables::MOVE_TABLES;

static LOGGING: LazyLock<()> = LazyLock::new(|| {
    color_backtrace::install();

    tracing_subscriber::fmt()
        .without_time()
        .with_writer(stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();
});

/// Installs tracing and backtraces, and forces the attack tables so the
/// first generator call never pays for lazy initialization.
pub fn init() {
    LazyLock::force(&LOGGING);
    LazyLock::force(&MOVE_TABLES);
}
