//! Reverse proxy to the analytics service.

mod client;
pub mod dto;
mod service;

pub use client::{AnalyticsClient, Relayed, UpstreamError};
pub use service::{AnalyticsService, ProxyFailure};
