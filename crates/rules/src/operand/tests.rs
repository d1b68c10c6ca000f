use scenario_core::{database_accessor, payload_accessor, AstNode, ConstantValue, CustomList, DataModel};

use super::*;
use crate::tree::ViewTree;

fn model() -> DataModel {
    serde_yaml::from_str(
        r#"
tables:
  - name: transactions
    fields:
      - { name: amount, data_type: Float }
      - { name: status, data_type: String, is_enum: true, values: [open, closed] }
  - name: accounts
    fields:
      - { name: tier, data_type: String, is_enum: true, values: [gold, silver] }
      - { name: name, data_type: String }
links:
  - { name: account, from: transactions, to: accounts }
"#,
    )
    .unwrap()
}

fn lists() -> Vec<CustomList> {
    vec![CustomList {
        id: "list-1".to_string(),
        name: "Blocked IBANs".to_string(),
        description: None,
    }]
}

struct Fixture {
    model: DataModel,
    lists: Vec<CustomList>,
    payload: Vec<AstNode>,
    database: Vec<AstNode>,
}

impl Fixture {
    fn new() -> Self {
        let model = model();
        let payload = model.payload_accessors("transactions");
        let database = model.database_accessors("transactions", 2);
        Self {
            model,
            lists: lists(),
            payload,
            database,
        }
    }

    fn ctx(&self) -> OperandContext<'_> {
        OperandContext::new(
            SchemaContext::new(&self.model, "transactions", &self.lists),
            &self.payload,
            &self.database,
        )
    }
}

fn enum_names(options: &OperandOptions<'_>) -> Vec<String> {
    options
        .iter()
        .filter(|o| o.kind == OperandKind::Enum)
        .map(|o| o.display_name)
        .collect()
}

#[test]
fn equality_against_enum_payload_suggests_its_values() {
    let fx = Fixture::new();
    let tree = ViewTree::from_ast(&binary("=", payload_accessor("status"), AstNode::undefined()));
    let slot = tree.find_by_path("1").unwrap();

    let options = OperandOptions::resolve(&tree, slot, fx.ctx()).unwrap();
    assert_eq!(enum_names(&options), vec!["open", "closed"]);
    assert_eq!(
        options.enum_values(),
        &[ConstantValue::from("open"), ConstantValue::from("closed")]
    );
    // general candidates are still offered
    assert!(options.iter().any(|o| o.kind == OperandKind::Field));
}

#[test]
fn equality_against_linked_enum_field() {
    let fx = Fixture::new();
    let lhs = database_accessor("transactions", &["account".to_string()], "tier");
    let tree = ViewTree::from_ast(&binary("=", AstNode::undefined(), lhs));
    let slot = tree.find_by_path("0").unwrap();

    let options = OperandOptions::resolve(&tree, slot, fx.ctx()).unwrap();
    assert_eq!(enum_names(&options), vec!["gold", "silver"]);
}

#[test]
fn no_enum_suggestions_outside_equality() {
    let fx = Fixture::new();

    let tree = ViewTree::from_ast(&binary("≠", payload_accessor("status"), AstNode::undefined()));
    let slot = tree.find_by_path("1").unwrap();
    assert!(enum_names(&OperandOptions::resolve(&tree, slot, fx.ctx()).unwrap()).is_empty());

    // not an enum field
    let tree = ViewTree::from_ast(&binary("=", payload_accessor("amount"), AstNode::undefined()));
    let slot = tree.find_by_path("1").unwrap();
    assert!(enum_names(&OperandOptions::resolve(&tree, slot, fx.ctx()).unwrap()).is_empty());

    // sibling is a constant
    let tree = ViewTree::from_ast(&binary("=", AstNode::constant("open"), AstNode::undefined()));
    let slot = tree.find_by_path("1").unwrap();
    assert!(enum_names(&OperandOptions::resolve(&tree, slot, fx.ctx()).unwrap()).is_empty());

    // root has no parent
    let tree = ViewTree::from_ast(&AstNode::undefined());
    assert!(enum_names(&OperandOptions::resolve(&tree, tree.root(), fx.ctx()).unwrap()).is_empty());
}

#[test]
fn nested_equality_only_looks_one_level_up() {
    let fx = Fixture::new();
    let eq = binary("=", payload_accessor("status"), AstNode::function("And").with_child(AstNode::undefined()));
    let tree = ViewTree::from_ast(&eq);
    let slot = tree.find_by_path("1.0").unwrap();
    assert!(enum_names(&OperandOptions::resolve(&tree, slot, fx.ctx()).unwrap()).is_empty());
}

#[test]
fn categories_come_in_fixed_order() {
    let fx = Fixture::new();
    let tree = ViewTree::from_ast(&binary("=", payload_accessor("status"), AstNode::undefined()));
    let slot = tree.find_by_path("1").unwrap();
    let options = OperandOptions::resolve(&tree, slot, fx.ctx()).unwrap();

    let kinds: Vec<OperandKind> = options.iter().map(|o| o.kind).collect();
    let rank = |k: &OperandKind| match k {
        OperandKind::Field => 0,
        OperandKind::CustomList => 1,
        OperandKind::Function => 2,
        OperandKind::Enum => 3,
        OperandKind::Constant => 4,
    };
    assert!(kinds.windows(2).all(|w| rank(&w[0]) <= rank(&w[1])));

    let all: Vec<OperandOption> = options.iter().collect();
    // 2 payload + 2 database + 1 list + 6 aggregations + 4 other functions + 2 enums
    assert_eq!(all.len(), 17);
    assert_eq!(all[0].display_name, "amount");
    assert_eq!(all[2].display_name, "account.tier");
    assert_eq!(all[4].display_name, "Blocked IBANs");
    assert_eq!(all[4].node, custom_list_access("list-1"));
    assert_eq!(all[5].display_name, "Average");
    assert_eq!(all[5].node.named_str("tableName"), Some("transactions"));
}

#[test]
fn iteration_restarts() {
    let fx = Fixture::new();
    let tree = ViewTree::from_ast(&AstNode::undefined());
    let options = OperandOptions::resolve(&tree, tree.root(), fx.ctx()).unwrap();

    let first: Vec<_> = options.iter().take(3).collect();
    let second: Vec<_> = options.iter().take(3).collect();
    assert_eq!(first, second);
    assert_eq!(options.iter().count(), options.iter().count());
}

#[test]
fn search_is_case_insensitive() {
    let fx = Fixture::new();
    let tree = ViewTree::from_ast(&AstNode::undefined());
    let options = OperandOptions::resolve(&tree, tree.root(), fx.ctx()).unwrap();

    let found: Vec<String> = options.search("FUZZY").map(|o| o.display_name).collect();
    assert_eq!(found, vec!["Fuzzy match", "Fuzzy match any of"]);
    assert_eq!(options.search("zzz-none").count(), 0);
}

#[test]
fn unknown_node_is_an_error() {
    let fx = Fixture::new();
    let tree = ViewTree::from_ast(&AstNode::undefined());
    let other = ViewTree::from_ast(&AstNode::undefined());
    assert!(OperandOptions::resolve(&tree, other.root(), fx.ctx()).is_err());
}

#[test]
fn enum_search_matches_unquoted_values() {
    let fx = Fixture::new();
    let tree = ViewTree::from_ast(&binary("=", payload_accessor("status"), AstNode::undefined()));
    let slot = tree.find_by_path("1").unwrap();
    let options = OperandOptions::resolve(&tree, slot, fx.ctx()).unwrap();

    let found: Vec<OperandOption> = options.search("open").collect();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].kind, OperandKind::Enum);
    assert_eq!(found[0].display_name, "open");
    assert_eq!(found[0].node, AstNode::constant("open"));
}
