//! Test utilities for datacook integration tests
//!
//! Every fixture owns an isolated temporary data root.

pub mod test_fixture;
