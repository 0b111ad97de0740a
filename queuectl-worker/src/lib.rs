//! The worker binary's library half: process bootstrap [`config`], its
//! [`error`] type, and the long-lived poll/claim/execute/report [`worker`]
//! loop (spec §4.3). Split into a lib + thin `main.rs` the way
//! `hook_worker` is, so the loop is unit-testable without spawning a
//! process.

pub mod config;
pub mod error;
pub mod worker;

pub use config::Config;
pub use error::WorkerError;
pub use worker::Worker;
