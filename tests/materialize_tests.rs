use std::sync::Arc;

use seqkit::equality::{same_allocation, same_instance, values_equal, KeyEquality, StructuralEquality};
use seqkit::sequence::Seq;
use seqkit::source::LiveSource;
use seqkit::SeqError;
use tokio_test::{assert_err, assert_ok};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Person {
    name: String,
    age: u32,
}

fn person(name: &str, age: u32) -> Person {
    Person {
        name: name.to_string(),
        age,
    }
}

#[test]
fn test_first_on_empty_fails() {
    let empty = Seq::<i32>::empty();
    let err = assert_err!(empty.first());
    assert!(matches!(err, SeqError::EmptySequence));
}

#[test]
fn test_first_or_default_on_empty() {
    assert_eq!(Seq::<i32>::empty().first_or_default(0), 0);
    assert_eq!(Seq::<String>::empty().first_or_else(String::new), "");
}

#[test]
fn test_first_after_filter() {
    let seq = Seq::snapshot(vec![1, 3, 4, 6]).filter(|x| x % 2 == 0);
    assert_eq!(assert_ok!(seq.first()), 4);
    assert_eq!(seq.first_or_default(-1), 4);
}

#[test]
fn test_first_only_pulls_one_item() {
    // An infinite sequence would never finish a full drain
    let naturals = Seq::unfold(0u64, |n| Some((n, n + 1)));
    assert_eq!(assert_ok!(naturals.filter(|n| *n > 5).first()), 6);
}

#[test]
fn test_to_vec_is_independent_of_source() {
    let source = LiveSource::from(vec![1, 2, 3]);
    let mut owned = source.seq().to_vec();

    source.push(4);
    owned.push(99);

    assert_eq!(owned, vec![1, 2, 3, 99]);
    assert_eq!(source.to_vec(), vec![1, 2, 3, 4]);
}

#[test]
fn test_to_boxed_slice_sized_to_count() {
    let boxed = Seq::range(0, 5).to_boxed_slice();
    assert_eq!(boxed.len(), 5);
    assert_eq!(&*boxed, &[0, 1, 2, 3, 4]);
}

#[test]
fn test_to_frozen() {
    let list = Seq::snapshot(vec!["a", "b"]).to_frozen();
    assert_eq!(list.as_slice(), &["a", "b"]);
}

#[test]
fn test_terminal_operations_traverse_each_time() {
    let source = LiveSource::from(vec![1]);
    let seq = source.seq();
    assert_eq!(seq.count(), 1);
    source.push(2);
    assert_eq!(seq.count(), 2);
    assert_eq!(seq.to_vec(), vec![1, 2]);
}

#[test]
fn test_set_dedups_value_equal_instances() {
    let a = person("Ana", 30);
    let b = person("Ana", 30);

    // Two separate instances that are equal by value
    assert!(!same_instance(&a, &b));
    assert!(values_equal(&StructuralEquality, &a, &b));

    let set = Seq::snapshot(vec![a.clone(), b]).to_set();
    assert_eq!(set.len(), 1);
    assert!(set.contains(&a));
}

#[test]
fn test_set_keeps_first_occurrence() {
    let by_name = KeyEquality::new(|p: &Person| p.name.clone());
    let set = Seq::snapshot(vec![person("Ana", 30), person("Luis", 40), person("Ana", 99)])
        .to_set_with(by_name);

    let kept = set.into_vec();
    assert_eq!(kept, vec![person("Ana", 30), person("Luis", 40)]);
}

#[test]
fn test_identity_is_separate_from_value_equality() {
    let shared = Arc::new(person("Ana", 30));
    let alias = Arc::clone(&shared);
    let copy = Arc::new(person("Ana", 30));

    assert!(same_allocation(&shared, &alias));
    assert!(!same_allocation(&shared, &copy));
    assert!(values_equal(&StructuralEquality, &*shared, &*copy));
}
