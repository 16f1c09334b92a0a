//! Decision graph data model.
//!
//! A graph is a flat list of nodes and a flat list of edges. Edges refer to
//! nodes by id and are not required to resolve: referential integrity is a
//! validation rule, not a type-level guarantee.
//!
//! Enum-valued fields that the reconciliation pass is allowed to correct are
//! stored as [`Lenient`] so that an out-of-schema string survives
//! deserialization and can be reported (and reset) instead of failing the
//! whole document.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{EngineError, EngineResult};

/// A closed set of string values with a stable wire spelling.
pub trait SchemaEnum: Sized + Copy + PartialEq + 'static {
    /// Every valid variant, in declaration order.
    const VARIANTS: &'static [Self];

    /// Wire spelling of this variant.
    fn as_str(&self) -> &'static str;

    /// Parses the wire spelling. Exact match only.
    fn parse(value: &str) -> Option<Self> {
        Self::VARIANTS.iter().copied().find(|v| v.as_str() == value)
    }
}

/// An enum value that may fall outside its valid set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lenient<T> {
    /// A recognised value.
    Known(T),
    /// A string outside the valid set, kept verbatim.
    Unknown(String),
}

impl<T: SchemaEnum> Lenient<T> {
    /// Returns the recognised value, if any.
    #[must_use]
    pub fn known(&self) -> Option<T> {
        match self {
            Self::Known(v) => Some(*v),
            Self::Unknown(_) => None,
        }
    }

    /// Returns the raw wire spelling.
    #[must_use]
    pub fn raw(&self) -> &str {
        match self {
            Self::Known(v) => v.as_str(),
            Self::Unknown(s) => s.as_str(),
        }
    }

    /// Returns true if the value is in the valid set.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }
}

impl<T: SchemaEnum> From<T> for Lenient<T> {
    fn from(value: T) -> Self {
        Self::Known(value)
    }
}

impl<T: SchemaEnum> From<&str> for Lenient<T> {
    fn from(value: &str) -> Self {
        T::parse(value).map_or_else(|| Self::Unknown(value.to_string()), Self::Known)
    }
}

impl<T: SchemaEnum> Serialize for Lenient<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.raw())
    }
}

impl<'de, T: SchemaEnum> Deserialize<'de> for Lenient<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from(raw.as_str()))
    }
}

macro_rules! schema_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl SchemaEnum for $name {
            const VARIANTS: &'static [Self] = &[$(Self::$variant),+];

            fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

schema_enum! {
    /// The structural role of a node.
    NodeKind {
        /// The single sink the graph is optimising for.
        Goal => "goal",
        /// The single source: the choice being made.
        Decision => "decision",
        /// One alternative for the decision.
        Option => "option",
        /// A causal variable.
        Factor => "factor",
        /// A consequence that bears on the goal.
        Outcome => "outcome",
        /// A downside that bears on the goal.
        Risk => "risk",
        /// A concrete step attached to an option.
        Action => "action",
    }
}

schema_enum! {
    /// Structural category of a factor node.
    FactorCategory {
        /// Influenced by at least one option.
        Controllable => "controllable",
        /// Measured but not chosen.
        Observable => "observable",
        /// Neither measured nor influenced.
        External => "external",
    }
}

schema_enum! {
    /// Semantic type of a factor's value.
    FactorType {
        Cost => "cost",
        Price => "price",
        Time => "time",
        Probability => "probability",
        Revenue => "revenue",
        Demand => "demand",
        Quality => "quality",
        Other => "other",
    }
}

schema_enum! {
    /// How a factor's value was obtained from the source brief.
    ExtractionType {
        Explicit => "explicit",
        Inferred => "inferred",
        Range => "range",
        Observed => "observed",
    }
}

schema_enum! {
    /// Declared polarity of a causal edge.
    EffectDirection {
        Positive => "positive",
        Negative => "negative",
        Mixed => "mixed",
    }
}

impl EffectDirection {
    /// The direction matching the sign of `mean`, or `None` for zero/NaN.
    #[must_use]
    pub fn from_sign(mean: f64) -> Option<Self> {
        if mean > 0.0 {
            Some(Self::Positive)
        } else if mean < 0.0 {
            Some(Self::Negative)
        } else {
            None
        }
    }
}

impl NodeKind {
    /// Returns true for outcome and risk nodes.
    #[must_use]
    pub const fn is_outcome_or_risk(&self) -> bool {
        matches!(self, Self::Outcome | Self::Risk)
    }
}

/// Default `factor_type` for factors that must carry one.
pub const DEFAULT_FACTOR_TYPE: FactorType = FactorType::Other;

/// Default `uncertainty_drivers` entry for factors that must carry one.
pub const DEFAULT_UNCERTAINTY_DRIVER: &str = "Estimation uncertainty";

/// Data carried by a factor node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactorData {
    /// Current value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,

    /// Baseline value (status quo).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<f64>,

    /// Semantic type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factor_type: Option<Lenient<FactorType>>,

    /// Free-text sources of uncertainty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uncertainty_drivers: Option<Vec<String>>,

    /// Provenance of `value`.
    #[serde(
        default,
        rename = "extractionType",
        skip_serializing_if = "Option::is_none"
    )]
    pub extraction_type: Option<Lenient<ExtractionType>>,

    /// Fields outside the model, carried through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl FactorData {
    /// Returns true if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Data carried by an option node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionData {
    /// Factor id to the value this option sets it to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interventions: Option<BTreeMap<String, f64>>,

    /// Fields outside the model, carried through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl OptionData {
    /// Returns true if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Kind-dependent node payload.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    /// Factor payload.
    Factor(FactorData),
    /// Option payload.
    Interventions(OptionData),
    /// Payload of any other kind, preserved as-is.
    Opaque(serde_json::Value),
    /// No payload.
    Empty,
}

impl NodeData {
    fn default_for(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Factor => Self::Factor(FactorData::default()),
            NodeKind::Option => Self::Interventions(OptionData::default()),
            NodeKind::Goal
            | NodeKind::Decision
            | NodeKind::Outcome
            | NodeKind::Risk
            | NodeKind::Action => Self::Empty,
        }
    }
}

/// A node in the decision graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNode", into = "RawNode")]
pub struct Node {
    /// Unique id.
    pub id: String,
    /// Structural role.
    pub kind: NodeKind,
    /// Human-readable label.
    pub label: String,
    /// Declared factor category. Advisory: inference wins.
    pub category: Option<Lenient<FactorCategory>>,
    /// Kind-dependent payload.
    pub data: NodeData,
    /// Fields outside the model, carried through untouched.
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Serialize, Deserialize)]
struct RawNode {
    id: String,
    kind: NodeKind,
    #[serde(default)]
    label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<Lenient<FactorCategory>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl TryFrom<RawNode> for Node {
    type Error = serde_json::Error;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        let data = match (raw.kind, raw.data) {
            (kind, None | Some(serde_json::Value::Null)) => NodeData::default_for(kind),
            (NodeKind::Factor, Some(v)) => NodeData::Factor(serde_json::from_value(v)?),
            (NodeKind::Option, Some(v)) => NodeData::Interventions(serde_json::from_value(v)?),
            (_, Some(v)) => NodeData::Opaque(v),
        };
        Ok(Self {
            id: raw.id,
            kind: raw.kind,
            label: raw.label,
            category: raw.category,
            data,
            extra: raw.extra,
        })
    }
}

impl From<Node> for RawNode {
    fn from(node: Node) -> Self {
        let data = match node.data {
            NodeData::Factor(d) if d.is_empty() => None,
            NodeData::Interventions(d) if d.is_empty() => None,
            NodeData::Factor(d) => serde_json::to_value(d).ok(),
            NodeData::Interventions(d) => serde_json::to_value(d).ok(),
            NodeData::Opaque(v) => Some(v),
            NodeData::Empty => None,
        };
        Self {
            id: node.id,
            kind: node.kind,
            label: node.label,
            category: node.category,
            data,
            extra: node.extra,
        }
    }
}

impl Node {
    /// Creates a node with the empty payload for its kind.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: NodeKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            category: None,
            data: NodeData::default_for(kind),
            extra: serde_json::Map::new(),
        }
    }

    /// Creates a goal node.
    #[must_use]
    pub fn goal(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Goal, label)
    }

    /// Creates a decision node.
    #[must_use]
    pub fn decision(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Decision, label)
    }

    /// Creates an option node.
    #[must_use]
    pub fn option(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Option, label)
    }

    /// Creates a factor node.
    #[must_use]
    pub fn factor(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Factor, label)
    }

    /// Creates an outcome node.
    #[must_use]
    pub fn outcome(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Outcome, label)
    }

    /// Creates a risk node.
    #[must_use]
    pub fn risk(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Risk, label)
    }

    /// Creates an action node.
    #[must_use]
    pub fn action(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Action, label)
    }

    /// Sets the declared category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<Lenient<FactorCategory>>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Replaces the payload.
    #[must_use]
    pub fn with_data(mut self, data: NodeData) -> Self {
        self.data = data;
        self
    }

    /// Sets `data.value` (factor nodes only).
    #[must_use]
    pub fn with_value(mut self, value: f64) -> Self {
        if let Some(d) = self.factor_data_mut() {
            d.value = Some(value);
        }
        self
    }

    /// Sets `data.baseline` (factor nodes only).
    #[must_use]
    pub fn with_baseline(mut self, baseline: f64) -> Self {
        if let Some(d) = self.factor_data_mut() {
            d.baseline = Some(baseline);
        }
        self
    }

    /// Sets `data.factor_type` (factor nodes only).
    #[must_use]
    pub fn with_factor_type(mut self, factor_type: impl Into<Lenient<FactorType>>) -> Self {
        if let Some(d) = self.factor_data_mut() {
            d.factor_type = Some(factor_type.into());
        }
        self
    }

    /// Sets `data.uncertainty_drivers` (factor nodes only).
    #[must_use]
    pub fn with_uncertainty_drivers<I, S>(mut self, drivers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(d) = self.factor_data_mut() {
            d.uncertainty_drivers = Some(drivers.into_iter().map(Into::into).collect());
        }
        self
    }

    /// Sets `data.extractionType` (factor nodes only).
    #[must_use]
    pub fn with_extraction_type(
        mut self,
        extraction_type: impl Into<Lenient<ExtractionType>>,
    ) -> Self {
        if let Some(d) = self.factor_data_mut() {
            d.extraction_type = Some(extraction_type.into());
        }
        self
    }

    /// Adds one intervention (option nodes only).
    #[must_use]
    pub fn with_intervention(mut self, factor_id: impl Into<String>, value: f64) -> Self {
        if let NodeData::Interventions(d) = &mut self.data {
            d.interventions
                .get_or_insert_with(BTreeMap::new)
                .insert(factor_id.into(), value);
        }
        self
    }

    /// Factor payload, if this is a factor node.
    #[must_use]
    pub fn factor_data(&self) -> Option<&FactorData> {
        match &self.data {
            NodeData::Factor(d) => Some(d),
            _ => None,
        }
    }

    /// Mutable factor payload, if this is a factor node.
    pub fn factor_data_mut(&mut self) -> Option<&mut FactorData> {
        match &mut self.data {
            NodeData::Factor(d) => Some(d),
            _ => None,
        }
    }

    /// Intervention map, if this is an option node that declares one.
    #[must_use]
    pub fn interventions(&self) -> Option<&BTreeMap<String, f64>> {
        match &self.data {
            NodeData::Interventions(d) => d.interventions.as_ref(),
            _ => None,
        }
    }

    /// The recognised declared category, if any.
    #[must_use]
    pub fn declared_category(&self) -> Option<FactorCategory> {
        self.category.as_ref().and_then(Lenient::known)
    }
}

/// A directed edge between two node ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Optional stable id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Source node id.
    pub from: String,

    /// Target node id.
    pub to: String,

    /// Mean causal strength.
    #[serde(default, alias = "weight", skip_serializing_if = "Option::is_none")]
    pub strength_mean: Option<f64>,

    /// Standard deviation of the causal strength.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength_std: Option<f64>,

    /// Probability that the edge exists at all.
    #[serde(default, alias = "belief", skip_serializing_if = "Option::is_none")]
    pub belief_exists: Option<f64>,

    /// Declared polarity. `null` and absent are equivalent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect_direction: Option<Lenient<EffectDirection>>,

    /// Fields outside the model, carried through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Edge {
    /// Mean of a structural (membership) edge.
    pub const CANONICAL_MEAN: f64 = 1.0;
    /// Standard deviation of a structural edge.
    pub const CANONICAL_STD: f64 = 0.01;
    /// Existence probability of a structural edge.
    pub const CANONICAL_BELIEF: f64 = 1.0;

    /// Creates an edge with no metadata.
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            id: None,
            from: from.into(),
            to: to.into(),
            strength_mean: None,
            strength_std: None,
            belief_exists: None,
            effect_direction: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Creates an edge carrying the canonical structural tuple.
    #[must_use]
    pub fn structural(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(from, to)
            .with_strength(Self::CANONICAL_MEAN, Self::CANONICAL_STD)
            .with_belief(Self::CANONICAL_BELIEF)
            .with_direction(EffectDirection::Positive)
    }

    /// Sets a stable id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets mean and standard deviation.
    #[must_use]
    pub fn with_strength(mut self, mean: f64, std: f64) -> Self {
        self.strength_mean = Some(mean);
        self.strength_std = Some(std);
        self
    }

    /// Sets existence probability.
    #[must_use]
    pub fn with_belief(mut self, belief: f64) -> Self {
        self.belief_exists = Some(belief);
        self
    }

    /// Sets the declared direction.
    #[must_use]
    pub fn with_direction(mut self, direction: impl Into<Lenient<EffectDirection>>) -> Self {
        self.effect_direction = Some(direction.into());
        self
    }

    /// Stable identifier used in diagnostics: the explicit id, else `from->to`.
    #[must_use]
    pub fn label(&self) -> String {
        self.id
            .clone()
            .unwrap_or_else(|| format!("{}->{}", self.from, self.to))
    }

    /// The recognised declared direction, if any.
    #[must_use]
    pub fn direction(&self) -> Option<EffectDirection> {
        self.effect_direction.as_ref().and_then(Lenient::known)
    }
}

/// A decision graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    /// All nodes, in document order.
    pub nodes: Vec<Node>,
    /// All edges, in document order.
    pub edges: Vec<Edge>,
    /// Top-level fields outside the model, carried through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Graph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node.
    #[must_use]
    pub fn with_node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    /// Appends an edge.
    #[must_use]
    pub fn with_edge(mut self, edge: Edge) -> Self {
        self.edges.push(edge);
        self
    }

    /// First node with the given id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Parses a graph from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Precondition` if the document is not an object
    /// with `nodes` and `edges` arrays, and `EngineError::Serialization` if
    /// the arrays do not have graph shape.
    pub fn from_value(value: serde_json::Value) -> EngineResult<Self> {
        let Some(obj) = value.as_object() else {
            return Err(EngineError::precondition("graph must be a JSON object"));
        };
        for field in ["nodes", "edges"] {
            if !obj.get(field).is_some_and(serde_json::Value::is_array) {
                return Err(EngineError::precondition(format!(
                    "graph is missing its `{field}` array"
                )));
            }
        }
        serde_json::from_value(value).map_err(|e| EngineError::Serialization {
            message: format!("deserialize graph: {e}"),
        })
    }

    /// Parses a graph from JSON text.
    ///
    /// # Errors
    ///
    /// See [`Graph::from_value`]; malformed JSON is a serialization error.
    pub fn from_json(s: &str) -> EngineResult<Self> {
        let value: serde_json::Value =
            serde_json::from_str(s).map_err(|e| EngineError::Serialization {
                message: format!("parse graph JSON: {e}"),
            })?;
        Self::from_value(value)
    }

    /// Serializes to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Serialization` if the serializer fails.
    pub fn to_json_pretty(&self) -> EngineResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| EngineError::Serialization {
            message: format!("serialize graph: {e}"),
        })
    }

    /// BLAKE3 hex digest of the graph's canonical JSON encoding.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Serialization` if the serializer fails.
    pub fn fingerprint(&self) -> EngineResult<String> {
        let bytes = serde_json::to_vec(self).map_err(|e| EngineError::Serialization {
            message: format!("serialize graph: {e}"),
        })?;
        Ok(blake3::hash(&bytes).to_hex().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_parses_known_and_unknown() {
        let known: Lenient<FactorCategory> = "observable".into();
        assert_eq!(known, Lenient::Known(FactorCategory::Observable));
        assert!(known.is_known());

        let unknown: Lenient<FactorCategory> = "Controllable".into();
        assert_eq!(unknown.raw(), "Controllable");
        assert_eq!(unknown.known(), None);
    }

    #[test]
    fn test_lenient_keeps_raw_value_through_json() {
        let node: Node = serde_json::from_value(serde_json::json!({
            "id": "fac_a",
            "kind": "factor",
            "label": "A",
            "data": { "factor_type": "widgets", "extractionType": "explicit" }
        }))
        .unwrap();
        let data = node.factor_data().unwrap();
        assert_eq!(
            data.factor_type,
            Some(Lenient::Unknown("widgets".to_string()))
        );
        assert_eq!(
            data.extraction_type,
            Some(Lenient::Known(ExtractionType::Explicit))
        );

        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["data"]["factor_type"], "widgets");
    }

    #[test]
    fn test_edge_legacy_aliases() {
        let edge: Edge = serde_json::from_value(serde_json::json!({
            "from": "a", "to": "b", "weight": 0.4, "belief": 0.7, "effect_direction": null
        }))
        .unwrap();
        assert_eq!(edge.strength_mean, Some(0.4));
        assert_eq!(edge.belief_exists, Some(0.7));
        assert_eq!(edge.effect_direction, None);
        assert_eq!(edge.label(), "a->b");
    }

    #[test]
    fn test_option_interventions_deserialize() {
        let node: Node = serde_json::from_value(serde_json::json!({
            "id": "opt_a", "kind": "option", "label": "A",
            "data": { "interventions": { "fac_price": 12.5 } }
        }))
        .unwrap();
        assert_eq!(node.interventions().unwrap()["fac_price"], 12.5);
    }

    #[test]
    fn test_opaque_payload_is_preserved() {
        let value = serde_json::json!({
            "id": "out_a", "kind": "outcome", "label": "A", "data": { "unit": "USD" }
        });
        let node: Node = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(serde_json::to_value(&node).unwrap(), value);
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let value = serde_json::json!({
            "version": 3,
            "nodes": [
                { "id": "f", "kind": "factor", "label": "F", "description": "Seat price",
                  "data": { "value": 1.0, "extractionType": "explicit", "unit": "USD" } },
                { "id": "o", "kind": "option", "label": "O",
                  "data": { "interventions": { "f": 2.0 }, "rationale": "cheaper" } }
            ],
            "edges": [
                { "from": "f", "to": "g", "strength_mean": 0.5, "provenance": "interview" }
            ]
        });
        let g = Graph::from_value(value.clone()).unwrap();
        assert_eq!(g.extra["version"], 3);
        assert_eq!(g.nodes[0].extra["description"], "Seat price");
        assert_eq!(g.nodes[0].factor_data().unwrap().extra["unit"], "USD");
        assert_eq!(g.edges[0].extra["provenance"], "interview");
        assert_eq!(serde_json::to_value(&g).unwrap(), value);
    }

    #[test]
    fn test_empty_factor_data_is_not_serialized() {
        let json = serde_json::to_value(Node::factor("f", "F")).unwrap();
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_from_value_requires_arrays() {
        let err = Graph::from_value(serde_json::json!({ "nodes": [] })).unwrap_err();
        assert!(err.is_precondition());

        let err = Graph::from_value(serde_json::json!([1, 2])).unwrap_err();
        assert!(err.is_precondition());

        let err = Graph::from_value(serde_json::json!({
            "nodes": [{ "kind": "goal" }], "edges": []
        }))
        .unwrap_err();
        assert!(err.is_serialization());
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let g = Graph::new()
            .with_node(Node::goal("g", "Goal"))
            .with_edge(Edge::new("a", "g"));
        assert_eq!(g.fingerprint().unwrap(), g.clone().fingerprint().unwrap());
        let other = g.clone().with_node(Node::risk("r", "R"));
        assert_ne!(g.fingerprint().unwrap(), other.fingerprint().unwrap());
    }

    #[test]
    fn test_effect_direction_from_sign() {
        assert_eq!(EffectDirection::from_sign(0.2), Some(EffectDirection::Positive));
        assert_eq!(EffectDirection::from_sign(-0.2), Some(EffectDirection::Negative));
        assert_eq!(EffectDirection::from_sign(0.0), None);
        assert_eq!(EffectDirection::from_sign(f64::NAN), None);
    }
}
