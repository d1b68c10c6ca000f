//! Closed classification of wire nodes.

use std::fmt;
use std::str::FromStr;

use scenario_core::{AstNode, ConstantValue, DATABASE_ACCESS_NODE_NAME, PAYLOAD_NODE_NAME};

pub const CUSTOM_LIST_ACCESS_NODE_NAME: &str = "CustomListAccess";
pub const AGGREGATOR_NODE_NAME: &str = "Aggregator";
pub const FUZZY_MATCH_NODE_NAME: &str = "FuzzyMatch";
pub const FUZZY_MATCH_ANY_OF_NODE_NAME: &str = "FuzzyMatchAnyOf";
pub const TIME_ADD_NODE_NAME: &str = "TimeAdd";
pub const TIME_NOW_NODE_NAME: &str = "TimeNow";
pub const LIST_NODE_NAME: &str = "List";
pub const FILTER_NODE_NAME: &str = "Filter";

/// Reducers available to aggregation nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Aggregator {
    Avg,
    Count,
    CountDistinct,
    Max,
    Min,
    Sum,
}

impl Aggregator {
    pub const ALL: [Aggregator; 6] = [
        Aggregator::Avg,
        Aggregator::Count,
        Aggregator::CountDistinct,
        Aggregator::Max,
        Aggregator::Min,
        Aggregator::Sum,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregator::Avg => "AVG",
            Aggregator::Count => "COUNT",
            Aggregator::CountDistinct => "COUNT_DISTINCT",
            Aggregator::Max => "MAX",
            Aggregator::Min => "MIN",
            Aggregator::Sum => "SUM",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Aggregator::Avg => "Average",
            Aggregator::Count => "Count",
            Aggregator::CountDistinct => "Count distinct",
            Aggregator::Max => "Max",
            Aggregator::Min => "Min",
            Aggregator::Sum => "Sum",
        }
    }
}

impl fmt::Display for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Aggregator {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Aggregator::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| format!("unknown aggregator: '{}'", s))
    }
}

/// String similarity algorithms offered by fuzzy-match nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FuzzyAlgorithm {
    Ratio,
    PartialRatio,
    TokenSetRatio,
}

impl FuzzyAlgorithm {
    pub const ALL: [FuzzyAlgorithm; 3] = [
        FuzzyAlgorithm::Ratio,
        FuzzyAlgorithm::PartialRatio,
        FuzzyAlgorithm::TokenSetRatio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FuzzyAlgorithm::Ratio => "ratio",
            FuzzyAlgorithm::PartialRatio => "partial_ratio",
            FuzzyAlgorithm::TokenSetRatio => "token_set_ratio",
        }
    }
}

impl FromStr for FuzzyAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        FuzzyAlgorithm::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| format!("unknown fuzzy algorithm: '{}'", s))
    }
}

/// Direction of a time offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeSign {
    Plus,
    Minus,
}

impl TimeSign {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeSign::Plus => "+",
            TimeSign::Minus => "-",
        }
    }
}

impl FromStr for TimeSign {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "+" => Ok(TimeSign::Plus),
            "-" => Ok(TimeSign::Minus),
            other => Err(format!("unknown time sign: '{}'", other)),
        }
    }
}

/// Accepts ISO-8601 durations such as `PT1H`, `P7D`, `P1DT12H`.
pub fn is_iso_duration(s: &str) -> bool {
    let Some(rest) = s.strip_prefix('P') else {
        return false;
    };
    let mut saw_unit = false;
    let mut digits = 0;
    for ch in rest.chars() {
        match ch {
            '0'..='9' => digits += 1,
            'T' if digits == 0 => {}
            'Y' | 'M' | 'W' | 'D' | 'H' | 'S' if digits > 0 => {
                saw_unit = true;
                digits = 0;
            }
            _ => return false,
        }
    }
    saw_unit && digits == 0
}

/// Borrowed, typed view of one [`AstNode`].
///
/// Accessor shapes that do not carry their required parts classify as
/// [`NodeKind::Function`]; the validator reports them by name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind<'a> {
    Constant(&'a ConstantValue),
    /// Empty operand slot.
    Undefined,
    Payload {
        field: &'a str,
    },
    DatabaseAccess {
        table_name: &'a str,
        path: &'a [String],
        field_name: &'a str,
    },
    CustomListAccess {
        list_id: &'a str,
    },
    Aggregation {
        aggregator: Aggregator,
        table_name: &'a str,
        field_name: &'a str,
        label: &'a str,
        filters: &'a [AstNode],
    },
    FuzzyMatch {
        any_of: bool,
        algorithm: FuzzyAlgorithm,
        operands: &'a [AstNode],
    },
    TimeAdd {
        timestamp: &'a AstNode,
        sign: TimeSign,
        duration: &'a str,
    },
    TimeNow,
    /// Operator or any other named function.
    Function {
        name: &'a str,
    },
}

impl<'a> NodeKind<'a> {
    pub fn of(node: &'a AstNode) -> Self {
        if node.is_constant() {
            if let Some(value) = &node.constant {
                return NodeKind::Constant(value);
            }
        }
        if node.is_undefined() {
            return NodeKind::Undefined;
        }

        let classified = match node.name.as_str() {
            PAYLOAD_NODE_NAME => classify_payload(node),
            DATABASE_ACCESS_NODE_NAME => classify_database_access(node),
            CUSTOM_LIST_ACCESS_NODE_NAME => node
                .named_str("customListId")
                .map(|list_id| NodeKind::CustomListAccess { list_id }),
            AGGREGATOR_NODE_NAME => classify_aggregation(node),
            FUZZY_MATCH_NODE_NAME | FUZZY_MATCH_ANY_OF_NODE_NAME => classify_fuzzy_match(node),
            TIME_ADD_NODE_NAME => classify_time_add(node),
            TIME_NOW_NODE_NAME => Some(NodeKind::TimeNow),
            _ => None,
        };

        classified.unwrap_or(NodeKind::Function {
            name: node.name.as_str(),
        })
    }

    /// Stable tag for logs and descriptions.
    pub fn tag(&self) -> &'static str {
        match self {
            NodeKind::Constant(_) => "constant",
            NodeKind::Undefined => "undefined",
            NodeKind::Payload { .. } => "payload",
            NodeKind::DatabaseAccess { .. } => "database_access",
            NodeKind::CustomListAccess { .. } => "custom_list_access",
            NodeKind::Aggregation { .. } => "aggregation",
            NodeKind::FuzzyMatch { .. } => "fuzzy_match",
            NodeKind::TimeAdd { .. } => "time_add",
            NodeKind::TimeNow => "time_now",
            NodeKind::Function { .. } => "function",
        }
    }
}

fn classify_payload(node: &AstNode) -> Option<NodeKind<'_>> {
    let field = node.children.first()?.constant.as_ref()?.as_str()?;
    Some(NodeKind::Payload { field })
}

fn classify_database_access(node: &AstNode) -> Option<NodeKind<'_>> {
    let table_name = node.named_str("tableName")?;
    let field_name = node.named_str("fieldName")?;
    let path: &[String] = match node.named_children.get("path").and_then(|p| p.constant.as_ref()) {
        Some(ConstantValue::StringList(items)) => items,
        None => &[],
        Some(_) => return None,
    };
    Some(NodeKind::DatabaseAccess {
        table_name,
        path,
        field_name,
    })
}

fn classify_aggregation(node: &AstNode) -> Option<NodeKind<'_>> {
    let aggregator = node.named_str("aggregator")?.parse().ok()?;
    let filters = node
        .named_children
        .get("filters")
        .map(|list| list.children.as_slice())
        .unwrap_or(&[]);
    Some(NodeKind::Aggregation {
        aggregator,
        table_name: node.named_str("tableName").unwrap_or(""),
        field_name: node.named_str("fieldName").unwrap_or(""),
        label: node.named_str("label").unwrap_or(""),
        filters,
    })
}

fn classify_fuzzy_match(node: &AstNode) -> Option<NodeKind<'_>> {
    let algorithm = node.named_str("algorithm")?.parse().ok()?;
    Some(NodeKind::FuzzyMatch {
        any_of: node.name == FUZZY_MATCH_ANY_OF_NODE_NAME,
        algorithm,
        operands: &node.children,
    })
}

fn classify_time_add(node: &AstNode) -> Option<NodeKind<'_>> {
    let timestamp = node.named_children.get("timestampField")?;
    let sign = node.named_str("sign")?.parse().ok()?;
    let duration = node.named_str("duration")?;
    Some(NodeKind::TimeAdd {
        timestamp,
        sign,
        duration,
    })
}
