use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::foundation::error::StudioError;

fn image_at(x: f64, y: f64, w: f64, h: f64) -> ElementDraft {
    ElementDraft::image("a.png").at(x, y).sized(w, h)
}

fn recorder(store: &mut SceneStore) -> Rc<RefCell<Vec<SceneEvent>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    store.subscribe(move |e| sink.borrow_mut().push(e.clone()));
    log
}

#[test]
fn add_assigns_fresh_ids_and_count_based_z() {
    let mut store = SceneStore::default();
    let a = store.add_element(image_at(0.0, 0.0, 10.0, 10.0)).unwrap();
    let b = store.add_element(image_at(0.0, 0.0, 10.0, 10.0)).unwrap();
    assert_ne!(a, b);
    assert_eq!(store.element(&a).unwrap().z_index, 0);
    assert_eq!(store.element(&b).unwrap().z_index, 1);
    assert_eq!(store.revision(), 2);
}

#[test]
fn invalid_add_leaves_store_unchanged() {
    let mut store = SceneStore::default();
    let log = recorder(&mut store);
    let err = store
        .add_element(image_at(0.0, 0.0, 0.0, 10.0))
        .unwrap_err();
    assert!(matches!(err, StudioError::Validation(_)));
    assert!(store.elements().is_empty());
    assert_eq!(store.revision(), 0);
    assert!(log.borrow().is_empty());
}

#[test]
fn update_on_unknown_id_is_silent_noop() {
    let mut store = SceneStore::default();
    store.add_element(image_at(0.0, 0.0, 10.0, 10.0)).unwrap();
    let before = store.document().clone();
    let log = recorder(&mut store);

    store
        .update_element(&ElementId::from("missing"), &ElementPatch::position(5.0, 5.0))
        .unwrap();
    assert_eq!(store.document(), &before);
    assert!(log.borrow().is_empty());
}

#[test]
fn rejected_patch_is_not_partially_applied() {
    let mut store = SceneStore::default();
    let id = store.add_element(image_at(1.0, 2.0, 10.0, 10.0)).unwrap();
    let patch = ElementPatch {
        x: Some(50.0),
        opacity: Some(2.0),
        ..ElementPatch::default()
    };
    assert!(store.update_element(&id, &patch).is_err());
    assert_eq!(store.element(&id).unwrap().x, 1.0);
}

#[test]
fn empty_patch_emits_nothing() {
    let mut store = SceneStore::default();
    let id = store.add_element(image_at(1.0, 2.0, 10.0, 10.0)).unwrap();
    let log = recorder(&mut store);
    let rev = store.revision();
    store.update_element(&id, &ElementPatch::default()).unwrap();
    assert_eq!(store.revision(), rev);
    assert!(log.borrow().is_empty());
}

#[test]
fn delete_clears_selection_and_notifies() {
    let mut store = SceneStore::default();
    let id = store.add_element(image_at(0.0, 0.0, 10.0, 10.0)).unwrap();
    store.select(Some(&id));
    let log = recorder(&mut store);

    store.delete_element(&id);
    assert!(store.selection().is_none());
    assert!(store.get_selected_element().is_none());
    assert_eq!(
        log.borrow().as_slice(),
        &[
            SceneEvent::ElementDeleted(id.clone()),
            SceneEvent::SelectionChanged(None)
        ]
    );

    store.delete_element(&id);
    assert_eq!(log.borrow().len(), 2);
}

#[test]
fn front_and_back_dominate_with_duplicate_z() {
    let mut store = SceneStore::default();
    let ids: Vec<ElementId> = (0..3)
        .map(|_| store.add_element(image_at(0.0, 0.0, 10.0, 10.0)).unwrap())
        .collect();
    store
        .update_element(&ids[0], &ElementPatch::z_order(7))
        .unwrap();
    store
        .update_element(&ids[1], &ElementPatch::z_order(7))
        .unwrap();

    store.bring_to_front(&ids[2]).unwrap();
    let top = store.element(&ids[2]).unwrap().z_index;
    assert!(
        store
            .elements()
            .iter()
            .filter(|e| e.id != ids[2])
            .all(|e| e.z_index < top)
    );

    store.send_to_back(&ids[1]).unwrap();
    let bottom = store.element(&ids[1]).unwrap().z_index;
    assert!(
        store
            .elements()
            .iter()
            .filter(|e| e.id != ids[1])
            .all(|e| e.z_index > bottom)
    );
}

#[test]
fn z_reorder_emits_z_order_event() {
    let mut store = SceneStore::default();
    let a = store.add_element(image_at(0.0, 0.0, 10.0, 10.0)).unwrap();
    store.add_element(image_at(0.0, 0.0, 10.0, 10.0)).unwrap();
    let log = recorder(&mut store);
    store.bring_to_front(&a).unwrap();
    assert_eq!(log.borrow().as_slice(), &[SceneEvent::ZOrderChanged(a)]);
}

#[test]
fn hit_test_is_reverse_paint_order() {
    let mut store = SceneStore::default();
    let low = store.add_element(image_at(0.0, 0.0, 100.0, 100.0)).unwrap();
    let high = store.add_element(image_at(50.0, 50.0, 100.0, 100.0)).unwrap();

    let p = Point::new(75.0, 75.0);
    assert_eq!(store.get_element_at_point(p).unwrap().id, high);

    store.bring_to_front(&low).unwrap();
    assert_eq!(store.get_element_at_point(p).unwrap().id, low);

    assert!(store.get_element_at_point(Point::new(500.0, 500.0)).is_none());
}

#[test]
fn hit_test_ignores_rotation() {
    let mut store = SceneStore::default();
    let mut draft = image_at(0.0, 0.0, 100.0, 10.0);
    draft.rotation = 90.0;
    let id = store.add_element(draft).unwrap();
    assert_eq!(store.get_element_at_point(Point::new(90.0, 5.0)).unwrap().id, id);
    assert!(store.get_element_at_point(Point::new(50.0, 40.0)).is_none());
}

#[test]
fn duplicate_offsets_and_goes_on_top() {
    let mut store = SceneStore::default();
    let a = store.add_element(image_at(10.0, 10.0, 30.0, 40.0)).unwrap();
    store.add_element(image_at(0.0, 0.0, 5.0, 5.0)).unwrap();

    let dup = store.duplicate_element(&a).unwrap().unwrap();
    assert_ne!(dup, a);
    let copy = store.element(&dup).unwrap();
    let orig = store.element(&a).unwrap();
    assert_eq!((copy.x, copy.y), (orig.x + 20.0, orig.y + 20.0));
    assert_eq!(copy.body, orig.body);
    assert_eq!(copy.z_index, 2);

    assert!(
        store
            .duplicate_element(&ElementId::from("nope"))
            .unwrap()
            .is_none()
    );
}

#[test]
fn select_ignores_unknown_ids() {
    let mut store = SceneStore::default();
    let id = store.add_element(image_at(0.0, 0.0, 10.0, 10.0)).unwrap();
    store.select(Some(&id));
    assert_eq!(store.get_selected_element().unwrap().id, id);
    store.select(Some(&ElementId::from("ghost")));
    assert!(store.selection().is_none());
}

#[test]
fn presets_and_reset_go_through_update() {
    let mut store = SceneStore::default();
    let id = store.add_element(image_at(0.0, 0.0, 10.0, 10.0)).unwrap();
    store.apply_preset(&id, FilterPreset::Vibrant).unwrap();
    let f = store.element(&id).unwrap().as_image().unwrap().filters;
    assert_eq!((f.saturation, f.contrast), (50.0, 20.0));

    store.reset_filters(&id).unwrap();
    assert!(store.element(&id).unwrap().as_image().unwrap().filters.is_neutral());

    let text = store.add_element(ElementDraft::text("hi")).unwrap();
    assert!(store.apply_preset(&text, FilterPreset::Sepia).is_err());
}

#[test]
fn unsubscribe_stops_notifications() {
    let mut store = SceneStore::default();
    let log = Rc::new(RefCell::new(0usize));
    let sink = Rc::clone(&log);
    let sub = store.subscribe(move |_| *sink.borrow_mut() += 1);
    store.add_element(image_at(0.0, 0.0, 10.0, 10.0)).unwrap();
    assert!(store.unsubscribe(sub));
    assert!(!store.unsubscribe(sub));
    store.add_element(image_at(0.0, 0.0, 10.0, 10.0)).unwrap();
    assert_eq!(*log.borrow(), 1);
}

#[test]
fn load_document_replaces_state() {
    let mut store = SceneStore::default();
    let id = store.add_element(image_at(0.0, 0.0, 10.0, 10.0)).unwrap();
    store.select(Some(&id));

    let doc = CanvasDocument {
        width: 400,
        height: 300,
        ..CanvasDocument::default()
    };
    store.load_document(doc.clone()).unwrap();
    assert_eq!(store.document(), &doc);
    assert!(store.selection().is_none());

    let bad = CanvasDocument {
        height: 0,
        ..CanvasDocument::default()
    };
    assert!(store.load_document(bad).is_err());
    assert_eq!(store.document(), &doc);
}

#[test]
fn snapshot_round_trips() {
    let mut store = SceneStore::default();
    store.add_element(ElementDraft::text("hello")).unwrap();
    store.add_element(image_at(1.0, 2.0, 3.0, 4.0)).unwrap();
    let snap = store.snapshot().unwrap();
    assert_eq!(&snap.to_document().unwrap(), store.document());
}

fn store_with_z(zs: &[i64]) -> (SceneStore, Vec<ElementId>) {
    let mut store = SceneStore::default();
    let ids: Vec<ElementId> = zs
        .iter()
        .map(|_| store.add_element(image_at(0.0, 0.0, 10.0, 10.0)).unwrap())
        .collect();
    for (id, z) in ids.iter().zip(zs) {
        store.update_element(id, &ElementPatch::z_order(*z)).unwrap();
    }
    (store, ids)
}

fn z_of(store: &SceneStore, id: &ElementId) -> i64 {
    store.element(id).unwrap().z_index
}

#[test]
fn bring_to_front_at_max_z_renumbers_instead_of_overflowing() {
    let (mut store, ids) = store_with_z(&[i64::MAX, 3, 7]);
    store.bring_to_front(&ids[1]).unwrap();

    let top = z_of(&store, &ids[1]);
    assert!(top > z_of(&store, &ids[0]));
    assert!(top > z_of(&store, &ids[2]));
    // The others keep their relative order.
    assert!(z_of(&store, &ids[0]) > z_of(&store, &ids[2]));
}

#[test]
fn send_to_back_at_min_z_renumbers_instead_of_overflowing() {
    let (mut store, ids) = store_with_z(&[i64::MIN, 3, 7]);
    store.send_to_back(&ids[2]).unwrap();

    let bottom = z_of(&store, &ids[2]);
    assert!(bottom < z_of(&store, &ids[0]));
    assert!(bottom < z_of(&store, &ids[1]));
    assert!(z_of(&store, &ids[0]) < z_of(&store, &ids[1]));
}

#[test]
fn duplicate_at_max_z_still_lands_on_top() {
    let (mut store, ids) = store_with_z(&[i64::MAX, 0]);
    let copy = store.duplicate_element(&ids[1]).unwrap().unwrap();
    let z = z_of(&store, &copy);
    assert!(ids.iter().all(|id| z_of(&store, id) < z));
}
