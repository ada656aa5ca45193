use std::sync::Arc;

use super::ErrorBudget;

#[test]
fn unlimited_never_trips() {
    let budget = ErrorBudget::unlimited();
    budget.charge(1_000);
    assert!(!budget.limit_reached());
    assert_eq!(budget.spent(), 1_000);
}

#[test]
fn limit_trips_once_reached() {
    let budget = ErrorBudget::new(3);
    budget.charge(2);
    assert!(!budget.limit_reached());
    budget.charge(1);
    assert!(budget.limit_reached());
}

#[test]
fn charges_from_many_threads_add_up() {
    let budget = Arc::new(ErrorBudget::new(0));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let budget = Arc::clone(&budget);
            std::thread::spawn(move || {
                for _ in 0..100 {
                    budget.charge(1);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap_or_else(|_| panic!("worker panicked"));
    }
    assert_eq!(budget.spent(), 400);
}
