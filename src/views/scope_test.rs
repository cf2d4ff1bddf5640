use super::*;

#[test]
fn latest_load_is_current() {
    let scope = ViewScope::new();
    let first = scope.begin();
    assert!(scope.is_current(first));

    let second = scope.begin();
    assert!(!scope.is_current(first));
    assert!(scope.is_current(second));
}

#[test]
fn unmount_retires_every_load() {
    let scope = ViewScope::new();
    let generation = scope.begin();

    scope.unmount();

    assert!(!scope.is_mounted());
    assert!(!scope.is_current(generation));
    assert!(!scope.is_current(scope.begin()));
}
