use super::*;

#[test]
fn len_and_contains() {
    let span = Span::new(10, 20);
    assert_eq!(span.len(), 10);
    assert!(!span.is_empty());
    assert!(span.contains(10));
    assert!(!span.contains(20));
}

#[test]
fn merge_covers_both() {
    let merged = Span::new(30, 40).merge(Span::new(5, 12));
    assert_eq!(merged, Span::new(5, 40));
}

#[test]
fn point_is_empty() {
    assert!(Span::point(7).is_empty());
    assert_eq!(Span::DUMMY, Span::default());
}

#[test]
fn spans_order_by_start() {
    let mut spans = vec![Span::new(9, 10), Span::new(1, 4), Span::new(1, 2)];
    spans.sort();
    assert_eq!(spans, vec![Span::new(1, 2), Span::new(1, 4), Span::new(9, 10)]);
}
