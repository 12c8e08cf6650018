use std::collections::HashSet;

use quickcheck::quickcheck;
use seqkit::equality::{FnEquality, KeyEquality};
use seqkit::sequence::Seq;
use seqkit::source::LiveSource;

#[derive(Debug, Clone, PartialEq)]
struct Person {
    name: &'static str,
    city: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
struct Employee {
    name: &'static str,
    department_id: u32,
}

#[derive(Debug, Clone, PartialEq)]
struct Department {
    id: u32,
    name: &'static str,
}

fn people() -> Seq<'static, Person> {
    Seq::snapshot(vec![
        Person { name: "Ana", city: "Bogotá" },
        Person { name: "Luis", city: "Medellín" },
        Person { name: "Pedro", city: "Bogotá" },
    ])
}

fn employees() -> Seq<'static, Employee> {
    Seq::snapshot(vec![
        Employee { name: "Ana", department_id: 1 },
        Employee { name: "Luis", department_id: 2 },
    ])
}

fn departments() -> Seq<'static, Department> {
    Seq::snapshot(vec![
        Department { id: 1, name: "IT" },
        Department { id: 2, name: "HR" },
        Department { id: 3, name: "Sales" },
    ])
}

#[test]
fn test_filter_preserves_order() {
    let seq = Seq::snapshot(vec![5, 1, 4, 2, 3]).filter(|x| *x > 2);
    assert_eq!(seq.to_vec(), vec![5, 4, 3]);
}

#[test]
fn test_map_one_to_one() {
    let seq = Seq::snapshot(vec!["a", "bb", "ccc"]).map(|s| s.len());
    assert_eq!(seq.to_vec(), vec![1, 2, 3]);
}

#[test]
fn test_flat_map_outer_then_inner_order() {
    let students = Seq::snapshot(vec![("Ana", vec!["C#", "SQL"]), ("Luis", vec!["Java", "SQL"])]);

    let rows = students
        .flat_map(|student| Seq::snapshot(student.1.clone()), |student, course| {
            format!("{}:{}", student.0, course)
        })
        .to_vec();

    assert_eq!(rows, vec!["Ana:C#", "Ana:SQL", "Luis:Java", "Luis:SQL"]);
}

#[test]
fn test_flat_map_skips_empty_inner() {
    let rows = Seq::snapshot(vec![0usize, 2, 0, 1])
        .flat_map(|n| Seq::from_cloned(0..*n), |outer, inner| (*outer, inner))
        .to_vec();
    assert_eq!(rows, vec![(2, 0), (2, 1), (1, 0)]);
}

#[test]
fn test_flat_map_over_map_entries() {
    let groups = Seq::snapshot(vec![("Even", vec![2, 4, 6]), ("Odd", vec![1, 3, 5])]);
    let flattened = groups
        .flat_map(|pair| Seq::snapshot(pair.1.clone()), |pair, number| (pair.0, number))
        .to_vec();
    assert_eq!(flattened.len(), 6);
    assert_eq!(flattened[0], ("Even", 2));
    assert_eq!(flattened[3], ("Odd", 1));
}

#[test]
fn test_group_by_first_occurrence_order() {
    let groups = people().group_by(|p| p.city).to_vec();

    assert_eq!(groups.len(), 2);
    assert_eq!(*groups[0].key(), "Bogotá");
    assert_eq!(
        groups[0].iter().map(|p| p.name).collect::<Vec<_>>(),
        vec!["Ana", "Pedro"]
    );
    assert_eq!(*groups[1].key(), "Medellín");
    assert_eq!(groups[1].members().map(|p| p.name).to_vec(), vec!["Luis"]);
}

#[test]
fn test_group_by_with_custom_policy() {
    let words = Seq::snapshot(vec!["Apple", "avocado", "Banana", "apricot", "blueberry"]);
    let case_insensitive = KeyEquality::new(|c: &char| c.to_ascii_lowercase());

    let groups = words
        .group_by_with(|w| w.chars().next().unwrap_or(' '), case_insensitive)
        .map(|g| (*g.key(), g.len()))
        .to_vec();

    // The first-seen key wins
    assert_eq!(groups, vec![('A', 3), ('B', 2)]);
}

#[test]
fn test_group_by_is_lazy_until_traversed() {
    let source = seqkit::source::LiveSource::from(vec![1, 2, 3]);
    let grouped = source.seq().group_by(|x| x % 2);

    source.push(5);

    let sizes = grouped.map(|g| (*g.key(), g.len())).to_vec();
    assert_eq!(sizes, vec![(1, 3), (0, 1)]);
}

#[test]
fn test_inner_join_matches_only() {
    let rows = employees()
        .join(
            &departments(),
            |e| e.department_id,
            |d| d.id,
            |e, d| (e.name, d.name),
        )
        .to_vec();

    assert_eq!(rows, vec![("Ana", "IT"), ("Luis", "HR")]);
}

#[test]
fn test_join_cross_product_within_key() {
    let left = Seq::snapshot(vec![(1, "a"), (2, "b"), (1, "c")]);
    let right = Seq::snapshot(vec![(1, "x"), (1, "y"), (3, "z")]);

    let rows = left
        .join(&right, |l| l.0, |r| r.0, |l, r| format!("{}{}", l.1, r.1))
        .to_vec();

    assert_eq!(rows, vec!["ax", "ay", "cx", "cy"]);
}

#[test]
fn test_join_with_policy() {
    let left = Seq::snapshot(vec!["ALICE", "bob"]);
    let right = Seq::snapshot(vec![("alice", 30), ("Bob", 25), ("carol", 41)]);
    let ignore_case = FnEquality::new(
        |a: &String, b: &String| a.eq_ignore_ascii_case(b),
        |s: &String| s.to_ascii_lowercase().bytes().map(u64::from).sum::<u64>(),
    );

    let rows = left
        .join_with(
            &right,
            |l| l.to_string(),
            |r| r.0.to_string(),
            |l, r| (*l, r.1),
            ignore_case,
        )
        .to_vec();

    assert_eq!(rows, vec![("ALICE", 30), ("bob", 25)]);
}

#[test]
fn test_group_join_keeps_unmatched_left() {
    let rows = departments()
        .group_join(
            &employees(),
            |d| d.id,
            |e| e.department_id,
            |d, staff| (d.name, staff.map(|e| e.name).to_vec()),
        )
        .to_vec();

    assert_eq!(
        rows,
        vec![
            ("IT", vec!["Ana"]),
            ("HR", vec!["Luis"]),
            ("Sales", Vec::<&str>::new()),
        ]
    );
}

#[test]
fn test_group_join_members_are_empty_not_absent() {
    let rows = Seq::snapshot(vec![1, 2, 3])
        .group_join(&Seq::<i32>::empty(), |x| *x, |y| *y, |x, matches| (x, matches.count()))
        .to_vec();
    assert_eq!(rows, vec![(1, 0), (2, 0), (3, 0)]);
}

#[test]
fn test_join_rebuilds_index_per_traversal() {
    let departments = seqkit::source::LiveSource::from(vec![Department { id: 1, name: "IT" }]);
    let joined = employees().join(
        &departments.seq(),
        |e| e.department_id,
        |d| d.id,
        |e, d| (e.name, d.name),
    );

    assert_eq!(joined.count(), 1);
    departments.push(Department { id: 2, name: "HR" });
    assert_eq!(joined.to_vec(), vec![("Ana", "IT"), ("Luis", "HR")]);
}

#[test]
fn test_distinct_first_occurrence_wins() {
    let seq = Seq::snapshot(vec![3, 1, 3, 2, 1]);
    assert_eq!(seq.distinct().to_vec(), vec![3, 1, 2]);
}

#[test]
fn test_distinct_with_projection() {
    let seq = Seq::snapshot(vec![("Ana", 30), ("Luis", 40), ("Ana", 31)]);
    let by_name = KeyEquality::new(|p: &(&'static str, i32)| p.0);
    assert_eq!(seq.distinct_with(by_name).to_vec(), vec![("Ana", 30), ("Luis", 40)]);
}

#[test]
fn test_empty_inputs_produce_empty_outputs() {
    let empty = Seq::<i32>::empty();

    assert_eq!(empty.filter(|_| true).count(), 0);
    assert_eq!(empty.map(|x| x + 1).count(), 0);
    assert_eq!(empty.flat_map(|_| Seq::once(1), |a, b| a + b).count(), 0);
    assert_eq!(empty.group_by(|x| *x).count(), 0);
    assert_eq!(empty.join(&Seq::once(1), |x| *x, |y| *y, |x, y| x + y).count(), 0);
    assert_eq!(Seq::once(1).join(&empty, |x| *x, |y| *y, |x, y| x + y).count(), 0);
    assert_eq!(empty.group_join(&Seq::once(1), |x| *x, |y| *y, |x, _| x).count(), 0);
    assert_eq!(empty.distinct().count(), 0);
}

#[test]
fn property_group_count_equals_distinct_keys() {
    fn prop(items: Vec<u8>) -> bool {
        let groups = Seq::snapshot(items.clone()).group_by(|x| x % 7).to_vec();
        let distinct: HashSet<u8> = items.iter().map(|x| x % 7).collect();

        let mut seen_order = Vec::new();
        for x in &items {
            if !seen_order.contains(&(x % 7)) {
                seen_order.push(x % 7);
            }
        }

        let member_total: usize = groups.iter().map(|g| g.len()).sum();
        groups.len() == distinct.len()
            && groups.iter().map(|g| *g.key()).collect::<Vec<_>>() == seen_order
            && member_total == items.len()
    }
    quickcheck(prop as fn(Vec<u8>) -> bool);
}

#[test]
fn property_join_sizes() {
    fn prop(left: Vec<u8>, right: Vec<u8>) -> bool {
        let left_seq = Seq::snapshot(left.iter().map(|x| x % 5).collect::<Vec<_>>());
        let right_seq = Seq::snapshot(right.iter().map(|x| x % 5).collect::<Vec<_>>());

        let inner = left_seq.join(&right_seq, |l| *l, |r| *r, |l, r| (*l, *r)).count();
        let expected: usize = left_seq
            .iter()
            .map(|l| right_seq.iter().filter(|r| *r == l).count())
            .sum();

        let outer = left_seq
            .group_join(&right_seq, |l| *l, |r| *r, |l, matches| (l, matches.count()))
            .to_vec();

        inner == expected
            && outer.len() == left.len()
            && outer.iter().map(|(_, n)| n).sum::<usize>() == expected
    }
    quickcheck(prop as fn(Vec<u8>, Vec<u8>) -> bool);
}

#[test]
fn test_join_skips_unmatched_and_rebuilds_per_traversal() {
    let orders = Seq::snapshot(vec![(10, "pen"), (99, "ink"), (20, "cap"), (10, "nib")]);
    let customers = LiveSource::from(vec![(10, "Ana"), (20, "Luis")]);

    let rows = orders.join(&customers.seq(), |o| o.0, |c| c.0, |o, c| (o.1, c.1));
    assert_eq!(rows.to_vec(), vec![("pen", "Ana"), ("cap", "Luis"), ("nib", "Ana")]);

    customers.push((99, "Mei"));
    assert_eq!(
        rows.to_vec(),
        vec![("pen", "Ana"), ("ink", "Mei"), ("cap", "Luis"), ("nib", "Ana")]
    );
}
