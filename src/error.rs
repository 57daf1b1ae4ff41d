// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Failure kinds surfaced by the pipeline stages. Validation and
/// precondition errors reach the caller verbatim; external-call failures
/// are absorbed at the boundary and replaced with a templated degraded
/// result, so they only appear here when a caller invokes a boundary
/// collaborator directly.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Malformed or negative-limit policy. Fatal to the load only; a
    /// previously loaded policy stays in effect.
    #[error("policy error: {0}")]
    Policy(String),

    /// A transaction failed field validation. The ledger is unchanged.
    #[error("validation error: {0}")]
    Validation(String),

    /// No expense data recorded yet; record transactions first.
    #[error("no expense data recorded yet")]
    NoData,

    /// No breaches available; run breach detection first.
    #[error("no breaches detected to act on")]
    NoBreach,

    /// A policy document could not be turned into a budget tree.
    #[error("extraction error: {0}")]
    Extraction(String),

    /// A boundary collaborator (text generator, transport) failed.
    #[error("external call failed: {0}")]
    ExternalCall(String),
}
