//! Error Types
//!
//! This module defines the error types used throughout the rendering core.
//!
//! # Overview
//!
//! The main error type [`ProwlError`] covers all failure modes including:
//! - Shader variant resolution failures
//! - GPU pipeline and resource creation errors
//! - Mesh validation and serialization errors
//! - Command buffer recording misuse
//!
//! All public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, ProwlError>`.

use thiserror::Error;

/// The main error type for the Prowl rendering core.
///
/// Each variant provides specific context about what went wrong. Soft
/// failure paths (shadow tile exhaustion, property type mismatches) are
/// deliberately *not* errors — they degrade per-frame behavior instead.
#[derive(Error, Debug)]
pub enum ProwlError {
    // ========================================================================
    // Shader & Pipeline Errors
    // ========================================================================
    /// The requested keyword combination has no compiled variant.
    ///
    /// This is a programming error at the call site: variants are
    /// registered up front by the asset pipeline, and the render core
    /// never substitutes a different variant.
    #[error("Shader pass '{pass}' has no variant for keyword set {keywords:#018x}")]
    VariantNotFound { pass: String, keywords: u64 },

    /// GPU pipeline construction failed.
    #[error("Failed to create render pipeline: {0}")]
    PipelineCreateFailed(String),

    /// A resource layout declaration could not be realized on the device.
    #[error("Failed to create resource layout: {0}")]
    ResourceLayoutFailed(String),

    // ========================================================================
    // Mesh Errors
    // ========================================================================
    /// The mesh failed structural validation before upload.
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// The mesh binary stream was truncated or malformed.
    #[error("Mesh deserialization failed: {0}")]
    MeshDecodeFailed(String),

    /// Mesh serialization I/O failure.
    #[error("Mesh serialization failed: {0}")]
    MeshEncodeFailed(#[from] std::io::Error),

    // ========================================================================
    // Command Recording Errors
    // ========================================================================
    /// A recording operation was issued while the command buffer was idle,
    /// or recording was started twice.
    #[error("Invalid command buffer state: {0}")]
    InvalidRecordingState(&'static str),

    /// A draw was issued without an active pass/pipeline.
    #[error("Draw issued without an active shader pass")]
    NoActivePass,

    /// A draw was issued without a bound render target.
    #[error("No render target bound")]
    NoRenderTarget,
}

/// Convenient result alias used by all fallible APIs in this crate.
pub type Result<T> = std::result::Result<T, ProwlError>;
