use color_eyre::eyre::{Context, Result};
use sentry::ClientInitGuard;
use tracing_subscriber::{prelude::*, EnvFilter, Registry};
use tracing_tree::HierarchicalLayer;

/// Default filter used when `RUST_LOG` is not set.
///
/// The binary's own crate is logged at `trace`, the domain crate at `debug`.
pub fn default_filter(crate_name: &str) -> String {
    format!("warn,{crate_name}=trace,recipes=debug,tower_http=debug")
}

/// Initialises sentry when `SENTRY_DSN` is present.
///
/// The returned guard must be held for the lifetime of the process so queued
/// events are flushed on shutdown.
pub fn setup_sentry() -> Option<ClientInitGuard> {
    let dsn = std::env::var("SENTRY_DSN").ok()?;

    println!("Sentry reporting enabled");

    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            traces_sample_rate: 0.0,
            ..Default::default()
        },
    )))
}

pub fn setup_tracing(crate_name: &str) -> Result<()> {
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter(crate_name));

    let env_filter = EnvFilter::builder()
        .parse(&rust_log)
        .wrap_err_with(|| format!("Couldn't create env filter from {rust_log}"))?;

    let heirarchical = HierarchicalLayer::default()
        .with_writer(std::io::stdout)
        .with_indent_lines(true)
        .with_indent_amount(2)
        .with_thread_names(true)
        .with_thread_ids(true)
        .with_verbose_exit(true)
        .with_verbose_entry(true)
        .with_targets(true);

    Registry::default()
        .with(heirarchical)
        .with(sentry_tracing::layer())
        .with(env_filter)
        .try_init()
        .wrap_err("Failed to install tracing subscriber")?;

    Ok(())
}
