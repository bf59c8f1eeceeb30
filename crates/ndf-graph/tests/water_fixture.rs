use ndf_cnl::DefineKind;
use ndf_graph::{suggests, GraphComposer, MemberKind};
use ndf_test_utils::{assemble, WATER};
use pretty_assertions::assert_eq;

#[test]
fn test_water_has_two_morphs_and_shared_relation_target() {
    let water = assemble(WATER);
    let registry = &water.registry;

    let node = registry.node("water").unwrap();
    assert_eq!(node.description, "The most common liquid on Earth.");
    assert_eq!(
        node.morphs.iter().map(|m| m.morph_id.as_str()).collect::<Vec<_>>(),
        vec!["water", "ice_water"]
    );
    assert_eq!(node.morphs[0].relation_ids.len(), 1);
    assert_eq!(node.morphs[0].attribute_ids.len(), 2);
    assert!(node.morphs[1].relation_ids.is_empty());
    assert_eq!(node.morphs[1].attribute_ids.len(), 2);

    let oceans = registry.node("oceans").unwrap();
    assert!(!oceans.is_stub());
    assert_eq!(registry.referencing_relations("oceans").len(), 2);
    assert!(registry.node("earth").unwrap().is_stub());
    assert!(registry.dangling_references().is_empty());
}

#[test]
fn test_water_suggests_only_undefined_types() {
    let water = assemble(WATER);
    assert!(suggests(&water.report, DefineKind::Attribute, "state"));
    assert!(!suggests(&water.report, DefineKind::Attribute, "temperature"));
    assert!(!suggests(&water.report, DefineKind::Relation, "found_in"));
    assert!(!suggests(&water.report, DefineKind::Relation, "part_of"));
    assert!(water.schema.has_relation("contains"));
}

#[test]
fn test_moving_ice_state_back_to_default() {
    let mut water = assemble(WATER);
    let registry = &mut water.registry;
    let solid = registry
        .attributes
        .values()
        .find(|a| a.value == "solid")
        .map(|a| a.id.clone())
        .unwrap();

    registry
        .move_member(MemberKind::Attribute, &solid, "ice_water", "water")
        .unwrap();

    let views = GraphComposer::compose("chem", "", ["water"], registry);
    assert!(views.flat.node(&format!("value::{solid}")).is_some());
    assert_eq!(views.polymorphic.attributes.len(), 4);
}
