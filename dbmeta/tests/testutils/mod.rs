//! Test utilities for dbmeta integration tests
//!
//! Every test builds its own object model over the sample catalog, so tests
//! can run in parallel without sharing caches or query counters.

pub mod catalog_fixture;
