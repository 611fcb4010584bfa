use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize the tracing subscriber; logs go to stderr so replies stay clean on stdout.
///
/// `RUST_LOG` wins over the verbosity flag.
pub fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "warn,gauss=debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose)
                .with_file(verbose)
                .with_line_number(verbose),
        )
        .init();
}
