// src/error.rs
//! Backend failure taxonomy shared by the search and content clients

use thiserror::Error;

/// Why a backend sub-query produced no data.
///
/// Analyzers keep this value internally and only collapse it to a zero
/// result at their public boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Unavailable {
    #[error("{0} backend is not configured")]
    NotConfigured(&'static str),

    #[error("request to {service} failed: {message}")]
    Transport {
        service: &'static str,
        message: String,
    },

    #[error("{service} returned HTTP {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("failed to decode {service} response: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },
}

impl Unavailable {
    pub fn is_not_configured(&self) -> bool {
        matches!(self, Unavailable::NotConfigured(_))
    }
}
