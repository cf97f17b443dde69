//! Arguebuf documents (protobuf JSON mapping)
//!
//! Everything the graph model stores survives a round trip. Two values have no field
//! of their own in the schema and travel in userdata:
//! - node positions, under the graph userdata key `layout`,
//! - the named argumentation scheme of a non-support scheme, under the node userdata key
//!   `argumentationScheme`.
//!
//! Both keys are removed again on import. User keys that would read as one of them, or
//! that start with `~`, are written with an extra leading `~` and restored on import.

use super::{GraphBuilder, GraphTranslator};
use crate::aggregate::{ArgumentGraph, Atom, GraphState, Node, Scheme};
use crate::commands::{GraphResult, ImportError};
use crate::identifiers::{IdGenerator, NodeId};
use crate::value_objects::{
    ArgumentationScheme, Metadata, Position2D, Reference, Resource, SchemeType, Timestamps,
};
use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const SCHEMA_VERSION: u32 = 1;
const LAYOUT_KEY: &str = "layout";
const ARGUMENTATION_SCHEME_KEY: &str = "argumentationScheme";
const ESCAPE_PREFIX: char = '~';
const DEFAULT_SUFFIX: &str = "DEFAULT";

/// A complete Arguebuf graph
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArguebufDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ArguebufMetadata>,
    #[serde(default)]
    pub nodes: IndexMap<String, ArguebufNode>,
    #[serde(default)]
    pub edges: IndexMap<String, ArguebufEdge>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub resources: IndexMap<String, ArguebufResource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_claim: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub userdata: Metadata,
}

/// Creation and modification time, RFC 3339
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArguebufMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArguebufNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atom: Option<ArguebufAtom>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<ArguebufScheme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ArguebufMetadata>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub userdata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArguebufAtom {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<Reference>,
}

/// Exactly one of the fields is set, or none for an unclassified scheme
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArguebufScheme {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rephrase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArguebufEdge {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArguebufResource {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl From<&Resource> for ArguebufResource {
    fn from(resource: &Resource) -> Self {
        Self {
            text: resource.text.clone(),
            title: resource.title.clone(),
            source: resource.source.clone(),
        }
    }
}

impl From<ArguebufResource> for Resource {
    fn from(resource: ArguebufResource) -> Self {
        Self {
            text: resource.text,
            title: resource.title,
            source: resource.source,
        }
    }
}

impl ArguebufScheme {
    fn from_scheme(scheme: &Scheme) -> Self {
        let mut record = ArguebufScheme::default();
        match scheme.scheme_type {
            SchemeType::Support => {
                let suffix = scheme.argumentation_scheme.code().unwrap_or(DEFAULT_SUFFIX);
                record.support = Some(format!("SUPPORT_{suffix}"));
            }
            SchemeType::Attack => record.attack = Some(format!("ATTACK_{DEFAULT_SUFFIX}")),
            SchemeType::Rephrase => record.rephrase = Some(format!("REPHRASE_{DEFAULT_SUFFIX}")),
            SchemeType::Preference => {
                record.preference = Some(format!("PREFERENCE_{DEFAULT_SUFFIX}"))
            }
            SchemeType::Unknown => {}
        }
        record
    }

    /// Scheme type plus, for support schemes, the named argumentation scheme
    fn classify(&self, node: &str) -> Result<(SchemeType, ArgumentationScheme), ImportError> {
        let set = [
            self.support.is_some(),
            self.attack.is_some(),
            self.rephrase.is_some(),
            self.preference.is_some(),
        ];
        if set.iter().filter(|present| **present).count() > 1 {
            return Err(ImportError::MalformedNode {
                id: node.to_string(),
                reason: "scheme carries more than one scheme type".to_string(),
            });
        }

        if let Some(value) = &self.support {
            let code = value.strip_prefix("SUPPORT_").unwrap_or(value.as_str());
            if code == DEFAULT_SUFFIX {
                return Ok((SchemeType::Support, ArgumentationScheme::Unknown));
            }
            return ArgumentationScheme::from_code(code)
                .map(|scheme| (SchemeType::Support, scheme))
                .ok_or_else(|| ImportError::MalformedNode {
                    id: node.to_string(),
                    reason: format!("unknown support scheme '{value}'"),
                });
        }

        let scheme_type = if self.attack.is_some() {
            SchemeType::Attack
        } else if self.rephrase.is_some() {
            SchemeType::Rephrase
        } else if self.preference.is_some() {
            SchemeType::Preference
        } else {
            SchemeType::Unknown
        };
        Ok((scheme_type, ArgumentationScheme::Unknown))
    }
}

fn export_metadata(timestamps: &Timestamps) -> ArguebufMetadata {
    ArguebufMetadata {
        created: Some(timestamps.created.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        updated: Some(timestamps.updated.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
    }
}

fn parse_rfc3339(raw: &str) -> Result<DateTime<Utc>, ImportError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|_| ImportError::InvalidTimestamp(raw.to_string()))
}

fn import_metadata(metadata: Option<&ArguebufMetadata>) -> Result<Timestamps, ImportError> {
    let Some(metadata) = metadata else {
        return Ok(Timestamps::now());
    };
    let created = match &metadata.created {
        Some(raw) => parse_rfc3339(raw)?,
        None => Utc::now(),
    };
    let updated = match &metadata.updated {
        Some(raw) => parse_rfc3339(raw)?,
        None => created,
    };
    Ok(Timestamps { created, updated })
}

fn export_layout(graph: &GraphState) -> Option<serde_json::Value> {
    let layout: serde_json::Map<String, serde_json::Value> = graph
        .positions()
        .filter_map(|(id, position)| {
            serde_json::to_value(position)
                .ok()
                .map(|value| (id.to_string(), value))
        })
        .collect();
    (!layout.is_empty()).then(|| serde_json::Value::Object(layout))
}

fn import_layout(
    layout: Option<serde_json::Value>,
) -> Result<IndexMap<String, Position2D>, ImportError> {
    match layout {
        None => Ok(IndexMap::new()),
        Some(value) => serde_json::from_value(value).map_err(ImportError::from),
    }
}

/// Copy user entries, escaping keys that would read as `internal`
fn escape_userdata(user: &Metadata, internal: &str) -> Metadata {
    user.iter()
        .map(|(key, value)| {
            let key = if key == internal || key.starts_with(ESCAPE_PREFIX) {
                format!("{ESCAPE_PREFIX}{key}")
            } else {
                key.clone()
            };
            (key, value.clone())
        })
        .collect()
}

/// Split document userdata into the `internal` entry and the user entries
fn unescape_userdata(userdata: Metadata, internal: &str) -> (Option<serde_json::Value>, Metadata) {
    let mut entry = None;
    let mut user = Metadata::with_capacity(userdata.len());
    for (key, value) in userdata {
        if let Some(original) = key.strip_prefix(ESCAPE_PREFIX) {
            user.insert(original.to_string(), value);
        } else if key == internal {
            entry = Some(value);
        } else {
            user.insert(key, value);
        }
    }
    (entry, user)
}

/// Translator for Arguebuf documents
#[derive(Debug, Clone, Copy, Default)]
pub struct ArguebufTranslator;

impl GraphTranslator for ArguebufTranslator {
    type Document = ArguebufDocument;

    fn export(&self, graph: &GraphState) -> ArguebufDocument {
        let nodes = graph
            .nodes()
            .map(|node| {
                let record = match node {
                    Node::Atom(atom) => ArguebufNode {
                        atom: Some(ArguebufAtom {
                            text: Some(atom.text.clone()),
                            reference: atom.reference.clone(),
                        }),
                        scheme: None,
                        metadata: Some(export_metadata(&atom.timestamps)),
                        userdata: escape_userdata(&atom.metadata, ARGUMENTATION_SCHEME_KEY),
                    },
                    Node::Scheme(scheme) => {
                        let mut userdata =
                            escape_userdata(&scheme.metadata, ARGUMENTATION_SCHEME_KEY);
                        if scheme.scheme_type != SchemeType::Support
                            && scheme.argumentation_scheme != ArgumentationScheme::Unknown
                        {
                            userdata.insert(
                                ARGUMENTATION_SCHEME_KEY.to_string(),
                                scheme.argumentation_scheme.as_str().into(),
                            );
                        }
                        ArguebufNode {
                            atom: None,
                            scheme: Some(ArguebufScheme::from_scheme(scheme)),
                            metadata: Some(export_metadata(&scheme.timestamps)),
                            userdata,
                        }
                    }
                };
                (node.id().to_string(), record)
            })
            .collect();

        let edges = graph
            .edges()
            .map(|edge| {
                (
                    edge.id.to_string(),
                    ArguebufEdge {
                        source: Some(edge.source.to_string()),
                        target: Some(edge.target.to_string()),
                    },
                )
            })
            .collect();

        let mut userdata = escape_userdata(&graph.meta.userdata, LAYOUT_KEY);
        if let Some(layout) = export_layout(graph) {
            userdata.insert(LAYOUT_KEY.to_string(), layout);
        }

        ArguebufDocument {
            schema_version: Some(SCHEMA_VERSION),
            library_version: Some(env!("CARGO_PKG_VERSION").to_string()),
            metadata: Some(export_metadata(&graph.meta.timestamps)),
            nodes,
            edges,
            resources: graph
                .meta
                .resources
                .iter()
                .map(|(id, resource)| (id.clone(), ArguebufResource::from(resource)))
                .collect(),
            major_claim: graph.meta.major_claim.as_ref().map(NodeId::to_string),
            userdata,
        }
    }

    fn import(&self, document: ArguebufDocument, ids: IdGenerator) -> GraphResult<ArgumentGraph> {
        let reserved: HashSet<String> = document
            .nodes
            .keys()
            .chain(document.edges.keys())
            .cloned()
            .collect();
        let mut builder = GraphBuilder::new(ids, reserved);

        let (layout, userdata) = unescape_userdata(document.userdata, LAYOUT_KEY);
        let layout = import_layout(layout)?;

        for (raw_id, node) in document.nodes {
            let timestamps = import_metadata(node.metadata.as_ref())?;
            let (named, mut metadata) =
                unescape_userdata(node.userdata, ARGUMENTATION_SCHEME_KEY);
            let id = builder.node_id(Some(raw_id.clone()))?;

            let record = match (node.atom, node.scheme) {
                (Some(atom), None) => {
                    let text = atom.text.ok_or_else(|| ImportError::MissingField {
                        element: format!("node {raw_id}"),
                        field: "text",
                    })?;
                    // Atoms carry no internal entry; an unescaped key from another
                    // producer stays user data.
                    if let Some(value) = named {
                        metadata.insert(ARGUMENTATION_SCHEME_KEY.to_string(), value);
                    }
                    let mut record = Atom::new(id.clone(), text);
                    record.reference = atom.reference;
                    record.metadata = metadata;
                    record.timestamps = timestamps;
                    Node::Atom(record)
                }
                (None, Some(scheme)) => {
                    let (scheme_type, mut argumentation_scheme) = scheme.classify(&raw_id)?;
                    if let Some(named) = named {
                        if argumentation_scheme == ArgumentationScheme::Unknown {
                            argumentation_scheme = named
                                .as_str()
                                .and_then(ArgumentationScheme::from_name)
                                .unwrap_or_default();
                        }
                    }
                    let mut record = Scheme::new(id.clone(), scheme_type);
                    record.argumentation_scheme = argumentation_scheme;
                    record.metadata = metadata;
                    record.timestamps = timestamps;
                    Node::Scheme(record)
                }
                (Some(_), Some(_)) => {
                    return Err(ImportError::MalformedNode {
                        id: raw_id,
                        reason: "node is both an atom and a scheme".to_string(),
                    }
                    .into())
                }
                (None, None) => {
                    return Err(ImportError::MalformedNode {
                        id: raw_id,
                        reason: "node is neither an atom nor a scheme".to_string(),
                    }
                    .into())
                }
            };

            let position = layout.get(id.as_str()).copied();
            builder.add_node(record, position)?;
        }

        for (raw_id, edge) in document.edges {
            let source = edge.source.ok_or_else(|| ImportError::MissingField {
                element: format!("edge {raw_id}"),
                field: "source",
            })?;
            let target = edge.target.ok_or_else(|| ImportError::MissingField {
                element: format!("edge {raw_id}"),
                field: "target",
            })?;
            builder.add_edge(Some(raw_id), NodeId::from(source), NodeId::from(target))?;
        }

        let major_claim = document.major_claim.filter(|id| !id.is_empty()).map(NodeId::from);
        if let Some(claim) = &major_claim {
            if builder.state_mut().node(claim).is_none() {
                return Err(ImportError::DanglingEdge {
                    edge: "majorClaim".to_string(),
                    node: claim.to_string(),
                }
                .into());
            }
        }

        let meta = &mut builder.state_mut().meta;
        meta.timestamps = import_metadata(document.metadata.as_ref())?;
        meta.major_claim = major_claim;
        meta.resources = document
            .resources
            .into_iter()
            .map(|(id, resource)| (id, Resource::from(resource)))
            .collect();
        meta.userdata = userdata;

        builder.finish()
    }
}
