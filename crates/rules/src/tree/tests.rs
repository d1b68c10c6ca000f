//! Tests for the view-model arena, mutations and evaluation merging.

use std::collections::HashSet;
use std::sync::Arc;

use scenario_core::{
    AstNode, ConstantValue, EvaluationError, EvaluationErrorCode, NodeEvaluation,
};

use super::*;

fn leaf(name: &str) -> AstNode {
    AstNode::constant(name)
}

/// `OR(AND(x, y), AND(z))`
fn or_of_ands() -> AstNode {
    AstNode::function("Or")
        .with_child(AstNode::function("And").with_child(leaf("x")).with_child(leaf("y")))
        .with_child(AstNode::function("And").with_child(leaf("z")))
}

fn all_ids(tree: &ViewTree) -> HashSet<NodeId> {
    tree.preorder().into_iter().collect()
}

fn assert_parents_consistent(tree: &ViewTree) {
    assert!(tree.root_node().parent.is_none());
    for id in tree.preorder() {
        let node = tree.get(id).unwrap();
        for child in node.children.iter().chain(node.named_children.values()) {
            assert_eq!(tree.get(*child).unwrap().parent, Some(id));
        }
    }
}

#[test]
fn from_ast_assigns_unique_ids_and_parents() {
    let tree = ViewTree::from_ast(&or_of_ands());
    assert_eq!(tree.len(), 6);
    assert_eq!(all_ids(&tree).len(), 6);
    assert_parents_consistent(&tree);
}

#[test]
fn round_trip_through_plain_form_is_isomorphic() {
    let ast = AstNode::function("=")
        .with_child(scenario_core::payload_accessor("status"))
        .with_child(AstNode::constant(ConstantValue::Null))
        .with_named_child("label", AstNode::constant("check"));
    let tree = ViewTree::from_ast(&ast);
    let back = tree.to_ast();
    assert_eq!(back, ast);

    let again = ViewTree::from_ast(&back);
    assert_eq!(again.to_ast(), ast);
    assert!(all_ids(&again).is_disjoint(&all_ids(&tree)));
}

#[test]
fn remove_subtree_from_or_of_ands() {
    let tree = ViewTree::from_ast(&or_of_ands());
    let root = tree.root_node();
    let and_xy = root.children[0];
    let and_z = root.children[1];
    let before = tree.subtree_to_ast(and_xy).unwrap();

    let next = tree.remove(and_z).unwrap();

    let expected = AstNode::function("Or")
        .with_child(AstNode::function("And").with_child(leaf("x")).with_child(leaf("y")));
    assert_eq!(next.to_ast(), expected);
    assert_eq!(next.root_node().children, vec![and_xy]);
    assert_eq!(next.subtree_to_ast(and_xy).unwrap(), before);
    assert!(Arc::ptr_eq(tree.shared(and_xy).unwrap(), next.shared(and_xy).unwrap()));
    assert_parents_consistent(&next);
}

#[test]
fn remove_shrinks_by_subtree_size_and_keeps_other_ids() {
    let tree = ViewTree::from_ast(&or_of_ands());
    for id in tree.preorder() {
        if id == tree.root() {
            continue;
        }
        let removed_size = tree.subtree_size(id);
        let next = tree.remove(id).unwrap();
        assert_eq!(next.len(), tree.len() - removed_size);

        let survivors = all_ids(&next);
        assert!(survivors.is_subset(&all_ids(&tree)));
        assert!(!survivors.contains(&id));
    }
}

#[test]
fn removing_root_always_fails() {
    let tree = ViewTree::from_ast(&or_of_ands());
    assert_eq!(tree.remove(tree.root()).unwrap_err(), TreeError::RootRemoval(tree.root()));

    let single = ViewTree::from_ast(&leaf("only"));
    assert!(matches!(single.remove(single.root()), Err(TreeError::RootRemoval(_))));
}

#[test]
fn remove_named_child_drops_key() {
    let ast = AstNode::function("Aggregator")
        .with_named_child("label", leaf("total"))
        .with_named_child("fieldName", leaf("amount"));
    let tree = ViewTree::from_ast(&ast);
    let label = tree.find_by_path("label").unwrap();

    let next = tree.remove(label).unwrap();
    let keys: Vec<&str> = next.root_node().named_children.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["fieldName"]);
    assert_eq!(next.len(), 2);
}

#[test]
fn unknown_id_is_not_found_for_every_operation() {
    let tree = ViewTree::from_ast(&or_of_ands());
    let ghost = NodeId::new();
    assert_eq!(
        tree.set_constant(ghost, ConstantValue::Bool(true)).unwrap_err(),
        TreeError::NodeNotFound(ghost)
    );
    assert!(matches!(tree.set_operand(ghost, leaf("a")), Err(TreeError::NodeNotFound(_))));
    assert!(matches!(tree.set_operator(ghost, "And"), Err(TreeError::NodeNotFound(_))));
    assert!(matches!(tree.append_child(ghost, leaf("a")), Err(TreeError::NodeNotFound(_))));
    assert!(matches!(tree.remove(ghost), Err(TreeError::NodeNotFound(_))));
}

#[test]
fn set_constant_reads_back_and_keeps_siblings_shared() {
    let tree = ViewTree::from_ast(&or_of_ands());
    let x = tree.find_by_path("0.0").unwrap();
    let y = tree.find_by_path("0.1").unwrap();
    let and_z = tree.find_by_path("1").unwrap();

    let next = tree.set_constant(x, ConstantValue::Number(42.0)).unwrap();

    assert_eq!(next.get(x).unwrap().constant, Some(ConstantValue::Number(42.0)));
    assert!(Arc::ptr_eq(tree.shared(y).unwrap(), next.shared(y).unwrap()));
    assert!(Arc::ptr_eq(tree.shared(and_z).unwrap(), next.shared(and_z).unwrap()));
    assert_eq!(all_ids(&tree), all_ids(&next));
    // The previous version is untouched.
    assert_eq!(tree.get(x).unwrap().constant, Some(ConstantValue::from("x")));
}

#[test]
fn set_operand_replaces_subtree_with_fresh_ids() {
    let tree = ViewTree::from_ast(&or_of_ands());
    let and_z = tree.find_by_path("1").unwrap();
    let replacement = AstNode::function("=")
        .with_child(scenario_core::payload_accessor("amount"))
        .with_child(AstNode::constant(10.0));

    let next = tree.set_operand(and_z, replacement.clone()).unwrap();

    let new_id = next.find_by_path("1").unwrap();
    assert_ne!(new_id, and_z);
    assert!(!next.contains(and_z));
    assert_eq!(next.subtree_to_ast(new_id).unwrap(), replacement);
    assert_eq!(next.len(), tree.len() - 2 + replacement.size());
    assert_parents_consistent(&next);
}

#[test]
fn set_operand_on_root_replaces_whole_tree() {
    let tree = ViewTree::from_ast(&or_of_ands());
    let next = tree.set_operand(tree.root(), AstNode::undefined()).unwrap();
    assert_ne!(next.root(), tree.root());
    assert_eq!(next.len(), 1);
    assert!(next.root_node().parent.is_none());
}

#[test]
fn set_operator_keeps_children_even_when_arity_is_wrong() {
    let tree = ViewTree::from_ast(&or_of_ands());
    let and_xy = tree.find_by_path("0").unwrap();

    let next = tree.set_operator(and_xy, "Not").unwrap();

    let node = next.get(and_xy).unwrap();
    assert_eq!(node.name, "Not");
    assert_eq!(node.children, tree.get(and_xy).unwrap().children);
}

#[test]
fn append_child_mints_new_unique_id() {
    let tree = ViewTree::from_ast(&or_of_ands());
    let and_xy = tree.find_by_path("0").unwrap();

    let next = tree.append_child(and_xy, leaf("w")).unwrap();

    let expected = AstNode::function("And")
        .with_child(leaf("x"))
        .with_child(leaf("y"))
        .with_child(leaf("w"));
    assert_eq!(next.subtree_to_ast(and_xy).unwrap(), expected);

    let w = next.find_by_path("0.2").unwrap();
    assert!(!tree.contains(w));
    assert_eq!(all_ids(&next).len(), next.len());
    assert_eq!(next.get(w).unwrap().parent, Some(and_xy));
}

#[test]
fn merge_copies_errors_by_position_and_key() {
    let ast = AstNode::function("=")
        .with_child(scenario_core::payload_accessor("status"))
        .with_child(AstNode::undefined())
        .with_named_child("label", leaf("x"));
    let tree = ViewTree::from_ast(&ast);

    let mut eval = NodeEvaluation::clean_for(&ast);
    let missing = EvaluationError::new(EvaluationErrorCode::MissingOperand, "operand is empty");
    eval.children[1].errors.push(missing.clone());
    eval.named_children["label"]
        .errors
        .push(EvaluationError::new(EvaluationErrorCode::InvalidConstant, "bad"));

    let merged = tree.merge_evaluation(&eval).unwrap();

    let slot = merged.find_by_path("1").unwrap();
    assert_eq!(merged.get(slot).unwrap().errors, vec![missing]);
    let label = merged.find_by_path("label").unwrap();
    assert_eq!(merged.get(label).unwrap().errors.len(), 1);
    assert!(merged.root_node().errors.is_empty());
    assert_eq!(all_ids(&merged), all_ids(&tree));
    assert_parents_consistent(&merged);
}

#[test]
fn merge_is_idempotent() {
    let ast = or_of_ands();
    let tree = ViewTree::from_ast(&ast);
    let mut eval = NodeEvaluation::clean_for(&ast);
    eval.errors
        .push(EvaluationError::new(EvaluationErrorCode::Unexpected, "boom"));

    let once = tree.merge_evaluation(&eval).unwrap();
    let twice = once.merge_evaluation(&eval).unwrap();

    for id in once.preorder() {
        assert_eq!(once.get(id).unwrap().errors, twice.get(id).unwrap().errors);
    }
}

#[test]
fn merge_clears_errors_from_previous_round() {
    let ast = or_of_ands();
    let tree = ViewTree::from_ast(&ast);
    let mut dirty = NodeEvaluation::clean_for(&ast);
    dirty.children[0]
        .errors
        .push(EvaluationError::new(EvaluationErrorCode::Unexpected, "boom"));

    let with_errors = tree.merge_evaluation(&dirty).unwrap();
    let cleaned = with_errors
        .merge_evaluation(&NodeEvaluation::clean_for(&ast))
        .unwrap();

    assert!(cleaned.preorder().iter().all(|id| cleaned.get(*id).unwrap().errors.is_empty()));
}

#[test]
fn merge_rejects_shape_mismatch() {
    let ast = or_of_ands();
    let tree = ViewTree::from_ast(&ast);
    let and_z = tree.find_by_path("1").unwrap();
    // Evaluation computed before a mutation: stale.
    let stale = NodeEvaluation::clean_for(&ast);
    let mutated = tree.remove(and_z).unwrap();

    let err = mutated.merge_evaluation(&stale).unwrap_err();
    assert!(matches!(err, TreeError::ShapeMismatch { node, .. } if node == mutated.root()));

    let mut wrong_key = NodeEvaluation::clean_for(&ast);
    wrong_key
        .named_children
        .insert("extra".to_string(), NodeEvaluation::default());
    assert!(matches!(
        tree.merge_evaluation(&wrong_key),
        Err(TreeError::ShapeMismatch { .. })
    ));
}

#[test]
fn paths_resolve_both_ways() {
    let ast = AstNode::function("TimeAdd")
        .with_named_child("timestampField", AstNode::function("TimeNow"))
        .with_named_child("sign", leaf("+"));
    let tree = ViewTree::from_ast(&ast);
    let ts = tree.find_by_path("timestampField").unwrap();
    assert_eq!(tree.path_of(ts).unwrap(), "timestampField");
    assert_eq!(tree.path_of(tree.root()).unwrap(), "");
    assert_eq!(tree.find_by_path("").unwrap(), tree.root());
    assert!(matches!(tree.find_by_path("3"), Err(TreeError::InvalidPath(_))));

    let nested = ViewTree::from_ast(&or_of_ands());
    let y = nested.find_by_path("0.1").unwrap();
    assert_eq!(nested.path_of(y).unwrap(), "0.1");
    assert_eq!(nested.parent_of(y).unwrap().id, nested.find_by_path("0").unwrap());
}
