//! Shared guards for the staking contract suite.
//!
//! This crate provides:
//! - [`ownership`] — write-once single-owner record and equality check.

#![no_std]

pub mod ownership;

pub use ownership::*;
