//! Hierarchical change propagation: child entity events re-fire as a change
//! on the owning field of the parent, with subscription bookkeeping kept
//! correct through assignment and list mutation.

use std::cell::Cell;
use std::rc::Rc;

use pixelbench_model::{
    Entity, PropDef, PropMap, PropValue, Schema, append_to_list, props, remove_from_list,
};

fn child_schema() -> Rc<Schema> {
    Rc::new(
        Schema::new()
            .field("name", PropDef::string("child"))
            .field("count", PropDef::int(0)),
    )
}

fn parent_schema() -> Rc<Schema> {
    Rc::new(
        Schema::new()
            .field("favorite", PropDef::entity({
                let schema = child_schema();
                move || {
                    PropValue::Entity(
                        Entity::construct("Child", Rc::clone(&schema), PropMap::new())
                            .expect("child schema is valid"),
                    )
                }
            })
            .watch_children(true))
            .field("items", PropDef::entity_list().watch_children(true))
            .field("plain", PropDef::entity_list()),
    )
}

fn new_child() -> Entity {
    Entity::construct("Child", child_schema(), PropMap::new()).unwrap()
}

fn new_parent(child: &Entity) -> Entity {
    Entity::construct(
        "Parent",
        parent_schema(),
        props([("favorite", PropValue::Entity(child.clone()))]),
    )
    .unwrap()
}

fn count_events(parent: &Entity, field: &'static str) -> Rc<Cell<u32>> {
    let hits = Rc::new(Cell::new(0));
    {
        let hits = Rc::clone(&hits);
        parent
            .watch(field, move |_| hits.set(hits.get() + 1))
            .unwrap();
    }
    hits
}

#[test]
fn child_mutation_fires_parent_field_exactly_once() {
    let child = new_child();
    let parent = new_parent(&child);
    let hits = count_events(&parent, "favorite");

    child.set("count", PropValue::Int(1)).unwrap();
    assert_eq!(hits.get(), 1);

    child.set("name", PropValue::from("renamed")).unwrap();
    assert_eq!(hits.get(), 2);
}

#[test]
fn replacing_the_child_unsubscribes_the_old_one() {
    let old = new_child();
    let parent = new_parent(&old);
    let replacement = new_child();
    parent
        .set("favorite", PropValue::Entity(replacement.clone()))
        .unwrap();

    let hits = count_events(&parent, "favorite");
    old.set("count", PropValue::Int(5)).unwrap();
    assert_eq!(hits.get(), 0, "old child must be unwatched");

    replacement.set("count", PropValue::Int(5)).unwrap();
    assert_eq!(hits.get(), 1);
}

#[test]
fn list_elements_are_watched_after_append() {
    let child = new_child();
    let parent = new_parent(&new_child());
    append_to_list(&parent, "items", PropValue::Entity(child.clone())).unwrap();

    let hits = count_events(&parent, "items");
    child.set("count", PropValue::Int(3)).unwrap();
    assert_eq!(hits.get(), 1);
}

#[test]
fn removed_list_elements_are_unwatched() {
    let child = new_child();
    let parent = new_parent(&new_child());
    let value = PropValue::Entity(child.clone());
    append_to_list(&parent, "items", value.clone()).unwrap();
    remove_from_list(&parent, "items", &value).unwrap();

    let hits = count_events(&parent, "items");
    child.set("count", PropValue::Int(3)).unwrap();
    assert_eq!(hits.get(), 0);
}

#[test]
fn unwatched_list_fields_do_not_forward() {
    let child = new_child();
    let parent = new_parent(&new_child());
    append_to_list(&parent, "plain", PropValue::Entity(child.clone())).unwrap();

    let hits = count_events(&parent, "plain");
    child.set("count", PropValue::Int(3)).unwrap();
    assert_eq!(hits.get(), 0, "plain has watch_children disabled");
}

#[test]
fn propagation_climbs_two_levels() {
    let leaf = new_child();
    let mid = new_parent(&leaf);
    let root = new_parent(&new_child());
    append_to_list(&root, "items", PropValue::Entity(mid)).unwrap();

    let hits = count_events(&root, "items");
    leaf.set("count", PropValue::Int(7)).unwrap();
    assert_eq!(hits.get(), 1, "leaf change reaches the root through mid");
}

#[test]
fn dropping_the_parent_silences_forwarding() {
    let child = new_child();
    {
        let _parent = new_parent(&child);
    }
    // The forwarder holds only a weak reference; this must not panic.
    child.set("count", PropValue::Int(9)).unwrap();
}
