#![doc = include_str!("../README.md")]

pub mod config;
pub mod error;
pub mod metrics;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ArtifactError, BomDetectError, ConfigError, DetectorError, SearchError};

// 설정
pub use config::BomDetectConfig;

// 도메인 타입
pub use types::{DetectorKind, ExitClassification};
