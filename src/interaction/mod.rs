//! Event handling and user interactions for memory-lane-bot.
//!
//! This module turns inbound chat events into work:
//! - Extracting the user's description from @-mentions
//! - Building the generation request
//! - Coordinating replies between services (image generation, chat)

pub mod app_mention;
