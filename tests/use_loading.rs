use model_store::{use_loading, Model};

#[test]
fn test_empty_input_is_not_loading() {
    assert!(!use_loading([]));
    assert!(!use_loading(Vec::new()));
}

#[test]
fn test_any_true_flag_is_loading() {
    assert!(use_loading([true]));
    assert!(use_loading([false, true]));
    assert!(use_loading([true, false, false]));
    assert!(use_loading([true, true]));
}

#[test]
fn test_all_false_is_not_loading() {
    assert!(!use_loading([false]));
    assert!(!use_loading([false, false, false]));
}

/// Exhaustive over every list of up to four flags.
#[test]
fn test_matches_logical_or_for_all_short_lists() {
    for len in 0..=4u32 {
        for bits in 0..(1u32 << len) {
            let flags: Vec<bool> = (0..len).map(|i| bits & (1 << i) != 0).collect();
            assert_eq!(use_loading(flags.clone()), bits != 0, "flags = {:?}", flags);
        }
    }
}

#[test]
fn test_model_associated_function_delegates() {
    assert!(Model::<()>::use_loading([false, true]));
    assert!(!Model::<()>::use_loading(std::iter::empty()));
}
