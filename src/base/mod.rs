//! Core components, types, and utilities for the memory-lane-bot.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - Prompt construction and canned replies.
//! - Common types, error kinds, and result handling.

pub mod config;
pub mod errors;
pub mod prompts;
pub mod types;
