#![forbid(unsafe_code)]

//! Market Trial runtime.
//!
//! Wraps the kernel with configuration, key-value persistence for
//! achievements and reputation, save files, and journal replay.
//!
//! No game rules live here: every transition and invariant is delegated
//! to the kernel.

pub mod config;
pub mod storage;
pub mod replay;
pub mod snapshot_codec;
pub mod service;
