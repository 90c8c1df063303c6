//! Serialize/deserialize round trips over nested entity graphs.

use std::rc::Rc;

use pixelbench_model::{
    ClassRegistry, PropDef, PropMap, PropValue, Schema, props, restore_entity, to_json,
};
use pixelbench_types::{Grid, Size};
use proptest::prelude::*;

fn registry() -> ClassRegistry {
    let mut registry = ClassRegistry::new();
    registry
        .register(
            "Item",
            Rc::new(
                Schema::new()
                    .field("label", PropDef::string(""))
                    .field("weight", PropDef::float(1.0))
                    .field("stock", PropDef::int(0))
                    .field("fragile", PropDef::bool(false))
                    .field("extent", PropDef::size(Size::new(1, 1))),
            ),
        )
        .unwrap();
    registry
        .register(
            "Crate",
            Rc::new(
                Schema::new()
                    .field("label", PropDef::string("crate"))
                    .field("contents", PropDef::entity_list().watch_children(true))
                    .field("stamp", PropDef::pixels(Size::new(4, 4))),
            ),
        )
        .unwrap();
    registry
}

#[test]
fn nested_graph_round_trips_with_identity() {
    let registry = registry();
    let item = registry
        .construct(
            "Item",
            props([
                ("label", PropValue::from("gem")),
                ("stock", PropValue::Int(12)),
            ]),
        )
        .unwrap();
    let mut stamp: Grid<i64> = Grid::new(4, 4);
    stamp.set(2, 2, 3);
    let crate_entity = registry
        .construct(
            "Crate",
            props([
                ("contents", PropValue::List(vec![PropValue::Entity(item.clone())])),
                ("stamp", PropValue::Pixels(stamp)),
            ]),
        )
        .unwrap();

    let node = to_json(&registry, &crate_entity).unwrap();
    let restored = restore_entity(&registry, &node).unwrap();

    assert_eq!(restored.id(), crate_entity.id());
    assert_eq!(restored.get("label").unwrap(), PropValue::from("crate"));

    let contents = restored.get("contents").unwrap();
    let restored_item = contents.as_list().unwrap()[0].as_entity().unwrap().clone();
    assert_eq!(restored_item.id(), item.id());
    assert_eq!(restored_item.get("label").unwrap(), PropValue::from("gem"));
    assert_eq!(restored_item.get("stock").unwrap(), PropValue::Int(12));

    let stamp = restored.get("stamp").unwrap();
    assert_eq!(stamp.as_pixels().unwrap().get(2, 2), Some(&3));
}

#[test]
fn restoration_rewires_child_subscriptions() {
    let registry = registry();
    let item = registry.construct("Item", PropMap::new()).unwrap();
    let crate_entity = registry
        .construct(
            "Crate",
            props([("contents", PropValue::List(vec![PropValue::Entity(item)]))]),
        )
        .unwrap();
    let node = to_json(&registry, &crate_entity).unwrap();
    let restored = restore_entity(&registry, &node).unwrap();

    let hits = std::rc::Rc::new(std::cell::Cell::new(0));
    {
        let hits = std::rc::Rc::clone(&hits);
        restored
            .watch("contents", move |_| hits.set(hits.get() + 1))
            .unwrap();
    }
    let contents = restored.get("contents").unwrap();
    let restored_item = contents.as_list().unwrap()[0].as_entity().unwrap();
    restored_item.set("stock", PropValue::Int(5)).unwrap();
    assert_eq!(hits.get(), 1, "restored parents watch restored children");
}

proptest! {
    #[test]
    fn every_field_survives_a_round_trip(
        label in "[ -~]{0,32}",
        weight in -1.0e6f64..1.0e6,
        stock in any::<i64>(),
        fragile in any::<bool>(),
        w in 1u32..64,
        h in 1u32..64,
    ) {
        let registry = registry();
        let item = registry
            .construct(
                "Item",
                props([
                    ("label", PropValue::Str(label.clone())),
                    ("weight", PropValue::Float(weight)),
                    ("stock", PropValue::Int(stock)),
                    ("fragile", PropValue::Bool(fragile)),
                    ("extent", PropValue::Size(Size::new(w, h))),
                ]),
            )
            .unwrap();
        let node = to_json(&registry, &item).unwrap();
        let restored = restore_entity(&registry, &node).unwrap();

        prop_assert_eq!(restored.id(), item.id());
        prop_assert_eq!(restored.get("label").unwrap(), PropValue::Str(label));
        prop_assert_eq!(restored.get("weight").unwrap(), PropValue::Float(weight));
        prop_assert_eq!(restored.get("stock").unwrap(), PropValue::Int(stock));
        prop_assert_eq!(restored.get("fragile").unwrap(), PropValue::Bool(fragile));
        prop_assert_eq!(restored.get("extent").unwrap(), PropValue::Size(Size::new(w, h)));
    }
}
