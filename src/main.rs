use std::env;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() {
    init_tracing();
    if let Err(err) = family_tree_layout::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

/// Logs go to stderr so SVG and JSON output on stdout stay clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("FTL_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "family_tree_layout=debug,info"
        } else {
            "family_tree_layout=info,warn"
        })
    });

    let format = env::var("FTL_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());
    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}
