use super::*;
use pretty_assertions::assert_eq;

#[test]
fn message_fills_template() {
    let diag = Diagnostic::error(ErrorCode::E2001, Span::new(3, 9))
        .with_arg("int")
        .with_arg("string");
    assert_eq!(diag.message(), "type mismatch: expected `int`, found `string`");
}

#[test]
fn missing_args_render_placeholder() {
    let diag = Diagnostic::error(ErrorCode::E2010, Span::DUMMY).with_arg("Box");
    assert_eq!(diag.message(), "`Box` has no member named `?`");
}

#[test]
fn default_severity_comes_from_code() {
    assert!(!Diagnostic::of(ErrorCode::E3002, Span::DUMMY).is_error());
    assert!(Diagnostic::of(ErrorCode::E3001, Span::DUMMY).is_error());
}

#[test]
fn display_includes_position_labels_and_notes() {
    let diag = Diagnostic::error(ErrorCode::E4002, Span::new(10, 14))
        .with_arg("value")
        .with_label(Span::new(1, 5), "first declared here")
        .with_note("fields share one namespace per class");
    assert_eq!(
        diag.to_string(),
        "error [E4002] at 10..14: duplicate declaration of `value`\n  \
         --> 1..5: first declared here\n  \
         = note: fields share one namespace per class"
    );
}

#[test]
fn category_is_exposed() {
    let diag = Diagnostic::of(ErrorCode::E3001, Span::DUMMY);
    assert_eq!(diag.category(), Category::Pattern);
}
