//! Integration tests for cluster provisioning
//!
//! These tests drive the public API end to end: a `cluster.toml` on disk is
//! loaded, a node pool is built from it, and the full phase sequence runs
//! against local shells or dry-run executors.

pub mod dry_run;
pub mod helpers;
pub mod local_provisioning;
