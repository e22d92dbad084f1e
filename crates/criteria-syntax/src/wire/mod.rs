//! JSON wire format for criteria trees.
//!
//! Documents are camelCase objects whose `selectionComparison` names the
//! operator. Older documents carry the right-hand literal in `fieldValue`;
//! [`legacy`] upgrades them before they are turned into [`Node`]s.

pub mod legacy;

use crate::{
    ast::{node::Node, operator::Operator},
    error::{Result, SyntaxError},
};
use model::core::value::Value;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};
use tracing::trace;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireNode {
    #[serde(default)]
    pub selection_comparison: Operator,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_hand_side: Option<WireOperand>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant_value: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_criteria: Option<WireOperand>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aggregate_list: Vec<WireOperand>,

    /// Legacy right-hand literal, accepted on input only.
    #[serde(default, skip_serializing)]
    pub field_value: Option<serde_json::Value>,
}

/// A slot that holds a node, or a bare literal standing in for a `Constant`.
#[derive(Debug, Clone, PartialEq)]
pub enum WireOperand {
    Node(Box<WireNode>),
    Literal(serde_json::Value),
}

impl WireOperand {
    fn into_node(self) -> Result<Node> {
        match self {
            WireOperand::Node(wire) => Node::try_from(*wire),
            WireOperand::Literal(json) => literal(&json).map(Node::constant),
        }
    }
}

impl Serialize for WireOperand {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            WireOperand::Node(node) => node.serialize(serializer),
            WireOperand::Literal(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for WireOperand {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            object @ serde_json::Value::Object(_) => serde_json::from_value(object)
                .map(|node| WireOperand::Node(Box::new(node)))
                .map_err(D::Error::custom),
            literal => Ok(WireOperand::Literal(literal)),
        }
    }
}

fn literal(json: &serde_json::Value) -> Result<Value> {
    Value::from_json(json).ok_or_else(|| SyntaxError::InvalidLiteral(json.to_string()))
}

fn check_shape(wire: &WireNode) -> Result<()> {
    let operator = wire.selection_comparison;
    let invalid = |attribute| Err(SyntaxError::InvalidShape { operator, attribute });

    if !wire.aggregate_list.is_empty() && !(operator.is_aggregate() || operator.is_add()) {
        return invalid("aggregateList");
    }
    if wire.inner_criteria.is_some() && !operator.is_any() {
        return invalid("innerCriteria");
    }
    if wire.constant_value.is_some() && !operator.is_constant() {
        return invalid("constantValue");
    }
    Ok(())
}

impl TryFrom<WireNode> for Node {
    type Error = SyntaxError;

    fn try_from(wire: WireNode) -> Result<Self> {
        let wire = legacy::upgrade(wire)?;
        check_shape(&wire)?;

        let constant_value = wire.constant_value.as_ref().map(literal).transpose()?;
        let right_hand_side = wire.right_hand_side.map(WireOperand::into_node).transpose()?;
        let inner_criteria = wire.inner_criteria.map(WireOperand::into_node).transpose()?;
        let aggregate_list = wire
            .aggregate_list
            .into_iter()
            .map(WireOperand::into_node)
            .collect::<Result<Vec<_>>>()?;

        Ok(Node::from_parts(
            wire.selection_comparison,
            wire.field_name,
            right_hand_side,
            constant_value,
            inner_criteria,
            aggregate_list,
        ))
    }
}

impl From<Node> for WireNode {
    fn from(node: Node) -> Self {
        let operand = |node: &Node| WireOperand::Node(Box::new(WireNode::from(node.clone())));
        WireNode {
            selection_comparison: node.operator(),
            field_name: node.field_name().map(str::to_string),
            right_hand_side: node.right_hand_side().map(operand),
            constant_value: node.constant_value().map(Value::to_json),
            inner_criteria: node.inner_criteria().map(operand),
            aggregate_list: node.aggregate_list().iter().map(operand).collect(),
            field_value: None,
        }
    }
}

/// Parse a criteria document.
pub fn from_str(json: &str) -> Result<Node> {
    let wire: WireNode = serde_json::from_str(json)?;
    trace!(version = ?legacy::detect(&wire), "Parsed criteria document");
    Node::try_from(wire)
}

pub fn from_value(json: serde_json::Value) -> Result<Node> {
    let wire: WireNode = serde_json::from_value(json)?;
    Node::try_from(wire)
}

pub fn to_string(node: &Node) -> Result<String> {
    Ok(serde_json::to_string(&WireNode::from(node.clone()))?)
}

pub fn to_value(node: &Node) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(WireNode::from(node.clone()))?)
}
