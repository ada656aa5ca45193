use super::*;

#[test]
fn empty_string_is_pre_interned() {
    let interner = StringInterner::new();
    assert_eq!(interner.intern(""), Name::EMPTY);
    assert_eq!(interner.lookup(Name::EMPTY), "");
}

#[test]
fn interning_is_idempotent() {
    let interner = StringInterner::new();
    let a = interner.intern("Shape");
    let b = interner.intern("Shape");
    let c = interner.intern("Circle");
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(interner.lookup(c), "Circle");
}

#[test]
fn shared_handle_sees_same_table() {
    let shared = SharedInterner::new();
    let clone = shared.clone();
    let name = shared.intern("Box");
    assert_eq!(clone.intern("Box"), name);
    assert_eq!(clone.lookup(name), "Box");
}

#[test]
fn concurrent_interning_agrees() {
    let shared = SharedInterner::new();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let interner = shared.clone();
            std::thread::spawn(move || interner.intern("Pair"))
        })
        .collect();
    let names: Vec<Name> = handles
        .into_iter()
        .map(|h| h.join().unwrap_or_else(|_| panic!("interner thread panicked")))
        .collect();
    assert!(names.windows(2).all(|w| w[0] == w[1]));
}
