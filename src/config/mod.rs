// ABOUTME: Configuration module exposing environment-based server configuration
// ABOUTME: Re-exports the ServerConfig loaded from process environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Amara Wellness

//! Configuration management

/// Environment-based configuration for deployment-specific settings
pub mod environment;

pub use environment::ServerConfig;
