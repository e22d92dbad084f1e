//! Upgrade path for documents written before `rightHandSide` existed.
//!
//! Version 1 documents put the compared literal in `fieldValue`. Version 2
//! expresses it as `rightHandSide: { "selectionComparison": "Constant", ... }`.

use super::{WireNode, WireOperand};
use crate::{
    ast::operator::Operator,
    error::{Result, SyntaxError},
};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireVersion {
    V1,
    V2,
}

/// Detect the document version of a single wire node. Children are detected
/// separately when they are converted.
pub fn detect(wire: &WireNode) -> WireVersion {
    if wire.field_value.is_some() {
        WireVersion::V1
    } else {
        WireVersion::V2
    }
}

/// Rewrite a V1 node into V2 shape. V2 nodes pass through untouched.
pub fn upgrade(mut wire: WireNode) -> Result<WireNode> {
    if detect(&wire) == WireVersion::V2 {
        return Ok(wire);
    }
    if wire.right_hand_side.is_some() {
        return Err(SyntaxError::ConflictingRightHandSide {
            field: wire.field_name,
        });
    }

    let value = wire.field_value.take().unwrap_or_default();
    debug!(field = ?wire.field_name, "Upgrading legacy fieldValue to rightHandSide");
    wire.right_hand_side = Some(WireOperand::Node(Box::new(WireNode {
        selection_comparison: Operator::Constant,
        constant_value: Some(value),
        ..WireNode::default()
    })));
    Ok(wire)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ast::node::Node, wire::from_value};
    use serde_json::json;

    #[test]
    fn test_detect_version() {
        let legacy: WireNode = serde_json::from_value(json!({ "fieldName": "x", "fieldValue": 5 })).unwrap();
        let current: WireNode = serde_json::from_value(json!({ "fieldName": "x", "rightHandSide": 5 })).unwrap();

        assert_eq!(detect(&legacy), WireVersion::V1);
        assert_eq!(detect(&current), WireVersion::V2);
    }

    #[test]
    fn test_upgrade_moves_field_value_to_constant() {
        let legacy: WireNode = serde_json::from_value(json!({
            "selectionComparison": "Equal",
            "fieldName": "x",
            "fieldValue": 5
        }))
        .unwrap();

        let upgraded = upgrade(legacy).unwrap();
        assert!(upgraded.field_value.is_none());
        assert_eq!(
            serde_json::to_value(&upgraded).unwrap(),
            json!({
                "selectionComparison": "Equal",
                "fieldName": "x",
                "rightHandSide": { "selectionComparison": "Constant", "constantValue": 5 }
            })
        );
    }

    #[test]
    fn test_legacy_node_matches_current_node() {
        let legacy = from_value(json!({ "fieldName": "x", "fieldValue": 5 })).unwrap();
        assert_eq!(legacy, Node::equal("x", 5));
    }

    #[test]
    fn test_nested_legacy_nodes_are_upgraded() {
        let node = from_value(json!({
            "selectionComparison": "Or",
            "aggregateList": [
                { "fieldName": "x", "fieldValue": 1 },
                { "selectionComparison": "LessThan", "fieldName": "y", "fieldValue": "b" }
            ]
        }))
        .unwrap();

        assert_eq!(node, Node::or([Node::equal("x", 1), Node::less_than("y", "b")]));
    }

    #[test]
    fn test_conflicting_right_hand_side_is_rejected() {
        let err = from_value(json!({
            "fieldName": "x",
            "fieldValue": 5,
            "rightHandSide": 6
        }))
        .unwrap_err();

        assert!(matches!(
            err,
            SyntaxError::ConflictingRightHandSide { field: Some(ref f) } if f == "x"
        ));
    }
}
