//! Crate-level loopback and BDD tests.

mod support;
