//! Test utilities for dbmeta CLI integration tests

pub mod cli_fixture;
