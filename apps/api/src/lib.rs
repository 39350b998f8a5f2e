//! TaskPilot API Library
//!
//! Decomposes free-form tasks into subtasks with a planning agent, runs
//! each subtask through an execution agent, and streams progress events
//! to the caller while the work advances.

pub mod agents;
pub mod api;
pub mod config;
