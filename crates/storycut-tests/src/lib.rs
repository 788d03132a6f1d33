//! Integration test crate for Storycut.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on the core, timeline, and master crates to verify they
//! work together.

#[cfg(test)]
mod master;

#[cfg(test)]
mod timeline;
