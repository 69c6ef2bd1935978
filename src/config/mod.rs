// ABOUTME: Configuration module for environment-driven server settings
// ABOUTME: Re-exports the typed ServerConfig built from environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration management

pub mod environment;

pub use environment::{DatabaseUrl, Environment, ServerConfig};
