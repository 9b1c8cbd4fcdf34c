//! End-to-end tests for the wall-clock sampling event source.

mod common;
mod lifecycle_test;
