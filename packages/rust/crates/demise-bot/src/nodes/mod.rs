//! Command runners for the `demise` binary.

mod common;
mod discord;

pub(crate) use discord::{run_ingress_command, run_scan_command};
