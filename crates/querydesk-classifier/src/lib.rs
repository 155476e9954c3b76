// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway to the external classification service.
//!
//! Exposes a thin HTTP client whose analyze paths never fail: any
//! transport, status, or decode problem degrades to a neutral
//! [`Classification`] so ingestion continues without the service.

pub mod client;
pub mod types;

pub use client::ClassifierClient;
pub use types::{AnalyzeRequest, BatchResponse, Classification};
