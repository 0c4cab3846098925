//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls and resolution into use-case level APIs.
//! - Keep CLI and other callers decoupled from storage details.

pub mod birthday_service;
pub mod reminder_service;
