// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Status Translator
//!
//! Single table mapping engine status codes to caller-facing outcome tokens.
//! Every route that needs to interpret an engine status goes through
//! [`translate`].

use bytes::Bytes;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Unchanged,
    NotFound,
    /// Any other status. The engine body is kept untouched.
    Unknown(Bytes),
}

const STATUS_TABLE: &[(u16, OutcomeToken)] = &[
    (204, OutcomeToken::Success),
    (304, OutcomeToken::Unchanged),
    (404, OutcomeToken::NotFound),
];

/// Map an engine status code to an [`Outcome`]. Total over all codes.
pub fn translate(status_code: u16, raw_body: Bytes) -> Outcome {
    let token = STATUS_TABLE
        .iter()
        .find(|(code, _)| *code == status_code)
        .map(|(_, token)| *token);

    match token {
        Some(OutcomeToken::Success) => Outcome::Success,
        Some(OutcomeToken::Unchanged) => Outcome::Unchanged,
        Some(OutcomeToken::NotFound) => Outcome::NotFound,
        Some(OutcomeToken::Unknown) | None => Outcome::Unknown(raw_body),
    }
}

/// Serializable token, without the raw body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutcomeToken {
    #[serde(rename = "success")]
    Success,
    #[serde(rename = "unchanged")]
    Unchanged,
    #[serde(rename = "not found")]
    NotFound,
    #[serde(rename = "unknown")]
    Unknown,
}

impl Outcome {
    pub fn token(&self) -> OutcomeToken {
        match self {
            Outcome::Success => OutcomeToken::Success,
            Outcome::Unchanged => OutcomeToken::Unchanged,
            Outcome::NotFound => OutcomeToken::NotFound,
            Outcome::Unknown(_) => OutcomeToken::Unknown,
        }
    }

    /// The raw engine body for passthrough operations. Empty unless `Unknown`.
    pub fn into_body(self) -> Bytes {
        match self {
            Outcome::Unknown(body) => body,
            _ => Bytes::new(),
        }
    }
}
