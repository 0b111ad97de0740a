//! One module per CLI subcommand, each a thin `anyhow`-boundary wrapper
//! around `queuectl_queue`/`queuectl_supervisor`, grounded on
//! `posthog_cli`'s per-command modules (`anyhow::Context`, one-line
//! diagnostics, no error recovery — spec §7's propagation policy).

pub mod config;
pub mod dlq;
pub mod enqueue;
pub mod list;
pub mod status;
pub mod table;
pub mod worker;
