// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Olhos da Lei: AI-assisted public-safety monitoring console
//!
//! A hosted (or local) language model classifies camera observations into a
//! coarse risk level; escalated detections become incidents that an operator
//! can act on, including dispatching a response unit from a fixed roster.

pub mod ai;
pub mod alerts;
pub mod classifier;
pub mod config;
pub mod console;
pub mod dispatch;
pub mod error;
pub mod incidents;
pub mod reports;
pub mod roster;
pub mod web;

pub use config::AppConfig;
pub use error::{OlhosError, Result};
