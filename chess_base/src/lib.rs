//! # Base types for rookery
//!
//! This is an auxiliary crate for `rookery`, which contains the coordinate model and other
//! core stuff shared by the rule engine.
//!
//! Normally you don't want to use this crate directly. Use `rookery` instead.

pub mod bitboard;
pub mod geometry;
pub mod types;
