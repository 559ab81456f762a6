//! BOM 생성 유틸리티 -- 공유 헬퍼 함수

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// 문서 메타데이터에 기록되는 도구 이름
pub const TOOL_NAME: &str = "bomdetect";

/// 문서 메타데이터에 기록되는 도구 버전
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// 현재 UTC 시각을 RFC3339 형식으로 반환합니다.
pub fn current_timestamp() -> String {
    rfc3339(OffsetDateTime::now_utc())
}

/// 주어진 시각을 초 단위 RFC3339 형식 (YYYY-MM-DDTHH:MM:SSZ)으로 변환합니다.
///
/// 포맷할 수 없는 시각(연도 범위 밖)은 epoch로 대체합니다.
pub fn rfc3339(at: OffsetDateTime) -> String {
    at.replace_nanosecond(0)
        .ok()
        .and_then(|t| t.format(&Rfc3339).ok())
        .unwrap_or_else(|| "1970-01-01T00:00:00Z".to_owned())
}

/// SPDX 식별자에 쓸 수 없는 문자를 `-`로 바꿉니다.
pub fn sanitize_spdx_id(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}
