//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls and carry engines into use-case APIs.
//! - Keep CLI/host layers decoupled from storage details.

pub mod carry_service;
