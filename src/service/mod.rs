//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for the services used by the memory-lane-bot:
//! - Chat services (e.g., Slack)
//! - Image generation services (e.g., Replicate)
//!
//! Each service module defines both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod chat;
pub mod image;
