//! # Observability & Tracing
//!
//! The [`setup_tracing`] function initializes structured logging with the `tracing` crate.
//!
//! ## Configuration
//!
//! The subscriber uses a compact format that hides the crate/module prefix
//! (`with_target(false)`). Every node runs inside a `node{name=...}` span, so each
//! line already says who logged it.
//!
//! - **Configurable log levels** via the `RUST_LOG` environment variable
//! - **Default level** `info` when `RUST_LOG` is unset
//!
//! ## What Gets Traced
//!
//! - **Protocol milestones** (`info`): reorders, shipments, production orders, sales
//! - **Local failures** (`warn`): line breaks, warehouse stockouts, lost sales,
//!   unrecognized frames, lagging subscribers
//! - **Payloads** (`debug`): store requests and the frames behind them
//!
//! ## Usage Examples
//!
//! ```bash
//! # Protocol milestones only
//! RUST_LOG=info cargo run
//!
//! # Store traffic and payloads
//! RUST_LOG=debug cargo run
//!
//! # Every published frame
//! RUST_LOG=trace cargo run
//! ```
//!
//! ## Output Example
//!
//! ```text
//! INFO node{name=line-2-6}:check_and_reorder{day=3 line=line-2-6}: Parts buffer checked status=RED
//! INFO node{name=warehouse}:serve_line{line=line-2-6}: Parts shipped
//! WARN node{name=product-stock}:process_demand: Lost sale product=3 wanted=212 available=140
//! ```

use tracing_subscriber::EnvFilter;

pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false) // Node spans already name the source
        .compact() // Compact format shows spans inline (e.g., "node:serve_line")
        .init();
}
