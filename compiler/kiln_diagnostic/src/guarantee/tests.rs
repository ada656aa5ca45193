use super::*;

#[test]
fn only_nonzero_counts_produce_proof() {
    assert!(ErrorGuaranteed::from_error_count(0).is_none());
    assert!(ErrorGuaranteed::from_error_count(3).is_some());
}

#[test]
fn display_shows_error_message() {
    let proof = ErrorGuaranteed::from_error_count(1);
    assert_eq!(proof.map(|g| g.to_string()).as_deref(), Some("error(s) emitted"));
}
