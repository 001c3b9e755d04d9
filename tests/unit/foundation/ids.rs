use std::collections::HashSet;

use super::*;

#[test]
fn generated_ids_have_expected_shape() {
    let id = ElementId::generate();
    let mut parts = id.as_str().splitn(3, '-');
    assert_eq!(parts.next(), Some("element"));
    assert!(parts.next().unwrap().parse::<u64>().is_ok());
    assert_eq!(parts.next().unwrap().len(), 16);
}

#[test]
fn generated_ids_do_not_collide_in_a_burst() {
    let ids: HashSet<ElementId> = (0..1000).map(|_| ElementId::generate()).collect();
    assert_eq!(ids.len(), 1000);
}

#[test]
fn ids_serialize_as_plain_strings() {
    let id = ElementId::from("element-1-a");
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"element-1-a\"");
    assert_eq!(serde_json::to_string(&ProjectId(7)).unwrap(), "7");
}
