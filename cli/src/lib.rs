//! Keybox CLI - re-issue and inspect attestation certificates from files.

pub mod commands;
pub mod input;

#[cfg(test)]
mod testutil;
