use super::*;
use kiln_ir::Span;
use pretty_assertions::assert_eq;

fn unresolved(name: &str, at: u32) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2003, Span::new(at, at + 1)).with_arg(name)
}

#[test]
fn counts_only_errors() {
    let mut buffer = DiagnosticBuffer::new();
    buffer.report(unresolved("x", 0));
    buffer.report(Diagnostic::of(ErrorCode::E3002, Span::new(4, 5)));
    assert_eq!(buffer.len(), 2);
    assert_eq!(buffer.error_count(), 1);
    assert!(buffer.guarantee().is_some());
}

#[test]
fn deduplicates_identical_reports() {
    let mut buffer = DiagnosticBuffer::new();
    buffer.report(unresolved("x", 0));
    buffer.report(unresolved("x", 0));
    buffer.report(unresolved("y", 0));
    assert_eq!(buffer.len(), 2);
}

#[test]
fn unlimited_keeps_duplicates() {
    let mut buffer = DiagnosticBuffer::with_config(DiagnosticConfig::unlimited());
    buffer.report(unresolved("x", 0));
    buffer.report(unresolved("x", 0));
    assert_eq!(buffer.len(), 2);
}

#[test]
fn warnings_as_errors_promotes() {
    let mut buffer = DiagnosticBuffer::with_config(DiagnosticConfig {
        warnings_as_errors: true,
        ..DiagnosticConfig::default()
    });
    buffer.report(Diagnostic::of(ErrorCode::E4008, Span::DUMMY).with_arg("old"));
    assert_eq!(buffer.error_count(), 1);
    assert_eq!(buffer.diagnostics()[0].severity, Severity::Error);
}

#[test]
fn merge_preserves_buffer_order() {
    let mut first = DiagnosticBuffer::new();
    let mut second = DiagnosticBuffer::new();
    second.report(unresolved("b", 9));
    first.report(unresolved("a", 1));
    let merged = DiagnosticBuffer::merge_in_order([&first, &second]);
    let names: Vec<&str> = merged.iter().map(|d| d.args[0].as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn vec_is_a_sink() {
    let mut sink: Vec<Diagnostic> = Vec::new();
    sink.report(unresolved("z", 2));
    assert!(sink.has_errors());
}
