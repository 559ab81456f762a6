#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`EngineError`)
//! - [`config`]: Engine configuration (`EngineConfig`, builder, identity options)
//! - [`types`]: Domain types (`Dependency`, `DependencyGraph`, `BomFormat`, `BomDocument`)
//! - [`detector`]: Detectors (`Detector` trait, `RunGate`, `CargoDetector`, `NpmDetector`, `PipDetector`)
//! - [`filter`]: Include/exclude glob filter over detector kinds
//! - [`search`]: Candidate directory discovery
//! - [`engine`]: Execution engine (`ExecutionEngine`, `Evaluation`, `ExtractionReport`)
//! - [`identity`]: Project identity resolution (`IdentityResolver`, `ProjectIdentity`)
//! - [`code_location`]: Code location deduplication (`CodeLocationAggregator`)
//! - [`bom`]: Bill-of-materials generation (`ArtifactGenerator`, CycloneDX, SPDX)
//! - [`status`]: Per-kind status and exit classification (`StatusAggregator`)
//! - [`project`]: Main orchestrator (`ProjectManager`, `RunReport`)
//!
//! # Architecture
//!
//! ```text
//! scan_root --> find_candidates --> ExecutionEngine --> Evaluations
//!                                        |                  |
//!                              DetectorFilter/RunGate       +--> IdentityResolver
//!                                                           |         |
//!                                                           +--> CodeLocationAggregator
//!                                                                     |
//!                                                             ArtifactGenerator
//!                                                                     |
//!                                                   StatusAggregator --> ExitClassification
//! ```

pub mod bom;
pub mod code_location;
pub mod config;
pub mod detector;
pub mod engine;
pub mod error;
pub mod filter;
pub mod identity;
pub mod project;
pub mod search;
pub mod status;
pub mod types;

// --- Public API Re-exports ---

// Orchestrator
pub use project::{ArtifactFailure, EvaluationSummary, ProjectManager, RunReport};

// Configuration
pub use config::{EngineConfig, EngineConfigBuilder, IdentityOptions, VersionScheme};

// Error
pub use error::EngineError;

// Types
pub use types::{BomDocument, BomFormat, Dependency, DependencyGraph, NodeId};

// Detectors
pub use detector::{
    CargoDetector, ConfigRunGate, Detector, NpmDetector, PipDetector, RunGate, default_detectors,
};

// Pipeline stages
pub use code_location::{AggregationResult, CodeLocation, CodeLocationAggregator};
pub use engine::{Evaluation, ExecutionEngine, ExtractionOutcome, ExtractionReport};
pub use filter::DetectorFilter;
pub use identity::{IdentityResolver, ProjectIdentity};
pub use search::{Candidate, find_candidates};
pub use status::{DetectorStatus, StatusAggregator};

// Bill-of-materials generation
pub use bom::{ArtifactGenerator, ArtifactOutcome, BomGroup, DocumentOverrides, WrittenArtifact};
