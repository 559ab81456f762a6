//! 후보 디렉토리 탐색
//!
//! 스캔 루트에서 `max_depth`까지 내려가며 탐지기를 평가할 디렉토리를 모읍니다.
//! `exclude_dirs`에 있는 이름의 디렉토리는 하위까지 건너뜁니다.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use bomdetect_core::config::SearchConfig;

use crate::error::EngineError;

/// 탐지기 평가 대상 디렉토리
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// 디렉토리 경로
    pub path: PathBuf,
    /// 스캔 루트로부터의 깊이 (루트 = 0)
    pub depth: usize,
}

/// 스캔 루트 아래의 후보 디렉토리를 (깊이, 경로) 순으로 반환합니다.
///
/// # Errors
///
/// 스캔 루트가 디렉토리가 아니면 `EngineError::InvalidRoot`를 반환합니다.
/// 하위 항목의 읽기 실패는 경고 로그만 남기고 건너뜁니다.
pub fn find_candidates(root: &Path, config: &SearchConfig) -> Result<Vec<Candidate>, EngineError> {
    if !root.is_dir() {
        return Err(EngineError::InvalidRoot {
            root: root.display().to_string(),
        });
    }

    let mut candidates = Vec::new();
    let walker = WalkDir::new(root)
        .max_depth(config.max_depth)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_excluded(e.file_name(), &config.exclude_dirs));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(EngineError::Walk {
                    root: root.display().to_string(),
                    reason: e.to_string(),
                });
            }
            Err(e) => {
                warn!(root = %root.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if entry.file_type().is_dir() {
            let depth = entry.depth();
            candidates.push(Candidate {
                path: entry.into_path(),
                depth,
            });
        }
    }

    candidates.sort_by(|a, b| a.depth.cmp(&b.depth).then_with(|| a.path.cmp(&b.path)));
    debug!(root = %root.display(), candidates = candidates.len(), "search complete");
    Ok(candidates)
}

fn is_excluded(name: &std::ffi::OsStr, exclude_dirs: &[String]) -> bool {
    name.to_str()
        .is_some_and(|n| exclude_dirs.iter().any(|d| d == n))
}
