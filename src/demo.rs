//! Built-in demo graph

use crate::aggregate::{ArgumentGraph, NodePatch, SchemePatch};
use crate::commands::GraphResult;
use crate::identifiers::IdGenerator;
use crate::value_objects::{ArgumentationScheme, Position2D, Resource, SchemeType};

/// A small complete argument: one claim, one supporting and one attacking premise
pub fn demo_graph(ids: IdGenerator) -> GraphResult<ArgumentGraph> {
    let mut graph = ArgumentGraph::new(ids);

    graph.add_resource(
        "r1",
        Resource {
            text: "Tuition fees should be abolished. Education is a public good, \
                   although free tuition costs taxpayers a lot."
                .to_string(),
            title: Some("Tuition debate".to_string()),
            source: None,
        },
    );

    let claim = graph.add_atom_at(
        "Tuition fees should be abolished",
        Some(Position2D::new(0.0, 0.0)),
    )?;
    let premise = graph.add_atom_at(
        "Education is a public good",
        Some(Position2D::new(-200.0, 300.0)),
    )?;
    let objection = graph.add_atom_at(
        "Free tuition is expensive for taxpayers",
        Some(Position2D::new(200.0, 300.0)),
    )?;

    let support = graph.add_scheme_at(
        Some(SchemeType::Support),
        Some(Position2D::new(-100.0, 150.0)),
    )?;
    graph.update_node(
        &support.id,
        NodePatch::Scheme(SchemePatch {
            argumentation_scheme: Some(ArgumentationScheme::Values),
            ..SchemePatch::default()
        }),
    )?;
    let attack = graph.add_scheme_at(
        Some(SchemeType::Attack),
        Some(Position2D::new(100.0, 150.0)),
    )?;

    graph.add_edge(&premise.id, &support.id)?;
    graph.add_edge(&support.id, &claim.id)?;
    graph.add_edge(&objection.id, &attack.id)?;
    graph.add_edge(&attack.id, &claim.id)?;
    graph.set_major_claim(Some(&claim.id))?;

    Ok(graph)
}
