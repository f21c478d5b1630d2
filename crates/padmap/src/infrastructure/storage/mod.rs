//! Persistent storage for padmap.

pub mod config;
