//! Operator metadata: layout class, expected arity and presentation rank.

use scenario_core::{DATABASE_ACCESS_NODE_NAME, PAYLOAD_NODE_NAME, UNDEFINED_NODE_NAME};

use super::kind::*;

/// How an operator is laid out in the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorLayout {
    /// One operand per line (boolean connectives).
    TwoLine,
    /// Operands on one line around the operator.
    Inline,
}

/// Expected positional-children count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exact(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl std::fmt::Display for Arity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "exactly {}", n),
            Arity::AtLeast(n) => write!(f, "at least {}", n),
        }
    }
}

/// Metadata record for one operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorFunction {
    pub name: &'static str,
    pub layout: OperatorLayout,
    pub arity: Arity,
    /// Presentation order only; lower sorts first.
    pub sort_rank: u16,
}

const fn op(name: &'static str, layout: OperatorLayout, arity: Arity, sort_rank: u16) -> OperatorFunction {
    OperatorFunction {
        name,
        layout,
        arity,
        sort_rank,
    }
}

use Arity::{AtLeast, Exact};
use OperatorLayout::{Inline, TwoLine};

const OPERATORS: &[OperatorFunction] = &[
    op("And", TwoLine, AtLeast(1), 0),
    op("Or", TwoLine, AtLeast(1), 1),
    op("Not", Inline, Exact(1), 2),
    op("=", Inline, Exact(2), 10),
    op("≠", Inline, Exact(2), 11),
    op("<", Inline, Exact(2), 12),
    op("<=", Inline, Exact(2), 13),
    op(">", Inline, Exact(2), 14),
    op(">=", Inline, Exact(2), 15),
    op("+", Inline, Exact(2), 20),
    op("-", Inline, Exact(2), 21),
    op("*", Inline, Exact(2), 22),
    op("/", Inline, Exact(2), 23),
    op("IsInList", Inline, Exact(2), 30),
    op("IsNotInList", Inline, Exact(2), 31),
    op("StringContains", Inline, Exact(2), 32),
    op("StringNotContain", Inline, Exact(2), 33),
    op("ContainsAnyOf", Inline, Exact(2), 34),
    op("ContainsNoneOf", Inline, Exact(2), 35),
    op("StringStartsWith", Inline, Exact(2), 36),
    op("StringEndsWith", Inline, Exact(2), 37),
];

/// Look up operator metadata by wire name.
pub fn operator_function(name: &str) -> Option<&'static OperatorFunction> {
    OPERATORS.iter().find(|o| o.name == name)
}

/// Operators offered when the user picks the operator of a node, by rank.
pub fn main_operators() -> Vec<&'static OperatorFunction> {
    let mut ops: Vec<_> = OPERATORS.iter().collect();
    ops.sort_by_key(|o| o.sort_rank);
    ops
}

/// Non-operator node names understood by the validator.
pub const FUNCTION_NAMES: &[&str] = &[
    UNDEFINED_NODE_NAME,
    PAYLOAD_NODE_NAME,
    DATABASE_ACCESS_NODE_NAME,
    CUSTOM_LIST_ACCESS_NODE_NAME,
    AGGREGATOR_NODE_NAME,
    FUZZY_MATCH_NODE_NAME,
    FUZZY_MATCH_ANY_OF_NODE_NAME,
    TIME_ADD_NODE_NAME,
    TIME_NOW_NODE_NAME,
    LIST_NODE_NAME,
    FILTER_NODE_NAME,
];

/// Every known operator and function name, for suggestions.
pub fn known_names() -> Vec<&'static str> {
    OPERATORS
        .iter()
        .map(|o| o.name)
        .chain(FUNCTION_NAMES.iter().copied())
        .collect()
}
