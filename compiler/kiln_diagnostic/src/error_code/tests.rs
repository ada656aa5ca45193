use super::*;

#[test]
fn category_follows_leading_digit() {
    assert_eq!(ErrorCode::E2003.category(), Category::Type);
    assert_eq!(ErrorCode::E3001.category(), Category::Pattern);
    assert_eq!(ErrorCode::E4002.category(), Category::Semantic);
    assert_eq!(ErrorCode::E9001.category(), Category::Internal);
}

#[test]
fn warnings_by_default() {
    assert_eq!(ErrorCode::E3002.default_severity(), Severity::Warning);
    assert_eq!(ErrorCode::E4008.default_severity(), Severity::Warning);
    assert_eq!(ErrorCode::E3001.default_severity(), Severity::Error);
}

#[test]
fn display_is_code() {
    assert_eq!(ErrorCode::E2010.to_string(), "E2010");
}
