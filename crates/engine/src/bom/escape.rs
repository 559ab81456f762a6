//! 파일 이름용 이스케이프
//!
//! `[A-Za-z0-9.-]` 밖의 모든 바이트를 `%XX`(대문자 16진수)로 인코딩합니다.
//! `%` 자신도 인코딩되므로 변환은 단사(injective)이고, 결과에는 `_`, `/`, 공백, `:`가
//! 나타나지 않아 `_`를 구분자로 쓰는 파일 이름에서 세그먼트가 섞이지 않습니다.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// 그대로 두는 문자는 영숫자와 `.`, `-`뿐
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'.').remove(b'-');

/// 파일 이름 세그먼트로 쓸 수 있게 이스케이프합니다.
pub fn escape_segment(value: &str) -> String {
    utf8_percent_encode(value, SEGMENT).to_string()
}

/// [`escape_segment`]의 역변환
///
/// 사람이 원문을 확인하는 용도입니다. 잘못된 시퀀스는 그대로 둡니다.
pub fn unescape_segment(value: &str) -> String {
    percent_decode_str(value).decode_utf8_lossy().into_owned()
}
