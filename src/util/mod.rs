//! Helpers shared by the state layer.
//!
//! SYSTEM CONTEXT
//! ==============
//! `storage` isolates where the session lives on disk, and `sequence` keeps
//! refetching views from applying stale responses.

pub mod sequence;
pub mod storage;
