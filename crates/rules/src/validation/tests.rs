//! Tests for formula and scenario validation.

use scenario_core::{
    database_accessor, payload_accessor, AstNode, CustomList, DataModel, EvaluationErrorCode, NodeEvaluation,
};

use super::*;
use crate::node::*;
use crate::schema::CommonMetadata;

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
      - { name: tier, data_type: String }
links:
  - { name: account, from: transactions, to: accounts }
"#,
    )
    .unwrap()
}

fn lists() -> Vec<CustomList> {
    vec![CustomList {
        id: "blocked-ibans".to_string(),
        name: "Blocked IBANs".to_string(),
        description: None,
    }]
}

fn validator() -> LocalValidator {
    LocalValidator::new(model(), "transactions", lists())
}

fn codes(eval: &NodeEvaluation) -> Vec<EvaluationErrorCode> {
    eval.errors.iter().map(|e| e.code).collect()
}

#[test]
fn clean_formula_has_no_errors_and_mirrors_shape() {
    let formula = AstNode::function("And")
        .with_child(binary(">", payload_accessor("amount"), AstNode::constant(10.0)))
        .with_child(binary(
            "=",
            database_accessor("transactions", &["account".to_string()], "tier"),
            AstNode::constant("gold"),
        ))
        .with_child(binary("IsInList", payload_accessor("status"), custom_list_access("blocked-ibans")));

    let eval = validator().evaluate(&formula);
    assert!(eval.matches_shape(&formula));
    assert!(!eval.has_errors(), "{eval:?}");
}

#[test]
fn unknown_payload_field_suggests_closest() {
    let eval = validator().evaluate(&payload_accessor("amout"));
    assert_eq!(codes(&eval), vec![EvaluationErrorCode::UnknownField]);
    assert!(eval.errors[0].message.contains("did you mean 'amount'"));
    assert_eq!(eval.errors[0].argument_index, Some(0));
}

#[test]
fn database_access_errors_name_the_argument() {
    let v = validator();

    let bad_link = database_accessor("transactions", &["acount".to_string()], "tier");
    let eval = v.evaluate(&bad_link);
    assert_eq!(codes(&eval), vec![EvaluationErrorCode::UnknownLink]);
    assert_eq!(eval.errors[0].argument_name.as_deref(), Some("path"));
    assert!(eval.errors[0].message.contains("did you mean 'account'"));

    let bad_field = database_accessor("transactions", &["account".to_string()], "tire");
    let eval = v.evaluate(&bad_field);
    assert_eq!(codes(&eval), vec![EvaluationErrorCode::UnknownField]);
    assert_eq!(eval.errors[0].argument_name.as_deref(), Some("fieldName"));

    let bad_table = database_accessor("transaction", &[], "amount");
    let eval = v.evaluate(&bad_table);
    assert_eq!(codes(&eval), vec![EvaluationErrorCode::UnknownTable]);
    assert_eq!(eval.errors[0].argument_name.as_deref(), Some("tableName"));
}

#[test]
fn operator_arity_and_unknown_functions() {
    let v = validator();

    let not = AstNode::function("Not")
        .with_child(AstNode::constant(true))
        .with_child(AstNode::constant(false));
    assert_eq!(codes(&v.evaluate(&not)), vec![EvaluationErrorCode::WrongNumberOfArguments]);

    let empty_and = AstNode::function("And");
    assert_eq!(
        codes(&v.evaluate(&empty_and)),
        vec![EvaluationErrorCode::WrongNumberOfArguments]
    );

    let typo = AstNode::function("Nott").with_child(AstNode::constant(true));
    let eval = v.evaluate(&typo);
    assert_eq!(codes(&eval), vec![EvaluationErrorCode::UndefinedFunction]);
    assert!(eval.errors[0].message.contains("did you mean 'Not'"));

    let malformed = AstNode::function(scenario_core::PAYLOAD_NODE_NAME);
    assert_eq!(codes(&v.evaluate(&malformed)), vec![EvaluationErrorCode::Unexpected]);
}

#[test]
fn empty_slots_and_function_arguments() {
    let v = validator();

    let eval = v.evaluate(&binary("=", payload_accessor("status"), AstNode::undefined()));
    assert!(eval.errors.is_empty());
    assert_eq!(codes(&eval.children[1]), vec![EvaluationErrorCode::MissingOperand]);

    let agg = aggregation(Aggregator::Sum, "transactions", "", "");
    let eval = v.evaluate(&agg);
    assert_eq!(codes(&eval), vec![EvaluationErrorCode::MissingOperand]);
    assert!(eval.matches_shape(&agg));

    let agg = aggregation(Aggregator::Sum, "transactions", "amount", "");
    assert!(!v.evaluate(&agg).has_errors());

    let list = custom_list_access("blocked-iban");
    let eval = v.evaluate(&list);
    assert_eq!(codes(&eval), vec![EvaluationErrorCode::UnknownCustomList]);
    assert!(eval.errors[0].message.contains("did you mean 'blocked-ibans'"));

    let mut offset = time_add();
    offset.named_children["timestampField"] = time_now();
    offset.named_children["duration"] = AstNode::constant("one day");
    let eval = v.evaluate(&offset);
    assert_eq!(codes(&eval), vec![EvaluationErrorCode::InvalidConstant]);
    assert!(eval.named_children["timestampField"].errors.is_empty());
}

#[test]
fn membership_in_literal_list_is_clean() {
    let formula = binary("IsInList", payload_accessor("status"), string_list(&["open", "closed"]));
    let eval = validator().evaluate(&formula);
    assert!(!eval.has_errors(), "{eval:?}");
    assert_eq!(
        formula.children[1].constant.as_ref().and_then(|c| c.as_string_list()),
        Some(&["open".to_string(), "closed".to_string()][..])
    );
}

fn scenario(id: &str, trigger: &str, formula: AstNode) -> ScenarioDocument {
    ScenarioDocument::new(CommonMetadata::new(id, "Test"), trigger, formula)
}

#[test]
fn validate_scenario_reports_node_paths() {
    let formula = AstNode::function("And")
        .with_child(binary(">", payload_accessor("amount"), AstNode::constant(1.0)))
        .with_child(binary("=", payload_accessor("status"), AstNode::undefined()));
    let result = validate_scenario(&scenario("open-status", "transactions", formula), &model(), &lists());

    assert!(!result.valid);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].path, "formula.1.1");
    assert!(result.errors[0].message.starts_with("[MISSING_OPERAND]"));
}

#[test]
fn validate_scenario_document_checks() {
    let result = validate_scenario(
        &scenario("Bad_Id", "transaction", AstNode::constant(true)),
        &model(),
        &lists(),
    );
    let paths: Vec<&str> = result.errors.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec!["metadata.id", "spec.trigger_table"]);
    assert_eq!(result.errors[1].suggestion.as_deref(), Some("transactions"));

    let mut disabled = scenario("ok", "transactions", AstNode::constant(true));
    disabled.metadata.enabled = false;
    let result = validate_scenario(&disabled, &model(), &lists());
    assert!(result.valid);
    assert_eq!(result.warnings.len(), 1);
}

#[tokio::test]
async fn local_validator_is_a_validation_service() {
    use crate::session::ValidationService;

    let node = payload_accessor("nope");
    let eval = validator().validate(&node).await.unwrap();
    assert_eq!(codes(&eval), vec![EvaluationErrorCode::UnknownField]);
}
