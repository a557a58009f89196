//! Contingency model: declared contingencies, their elements and the
//! evidence keys an element expands to.
//!
//! The simulator models a three-winding transformer as three two-winding
//! transformers, so the model, parameter and timeline artifacts name
//! `X_1`, `X_2` and `X_3` while the final state still reports `X`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Equipment type of a contingency element.
///
/// Unknown type strings are kept verbatim in [`ElementType::Other`] so a
/// registry written for a newer simulator still loads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ElementType {
    Load,
    Generator,
    DanglingLine,
    Line,
    TwoWindingsTransformer,
    ThreeWindingsTransformer,
    Branch,
    ShuntCompensator,
    StaticVarCompensator,
    BusbarSection,
    HvdcLine,
    Other(String),
}

impl ElementType {
    pub fn as_str(&self) -> &str {
        match self {
            ElementType::Load => "LOAD",
            ElementType::Generator => "GENERATOR",
            ElementType::DanglingLine => "DANGLING_LINE",
            ElementType::Line => "LINE",
            ElementType::TwoWindingsTransformer => "TWO_WINDINGS_TRANSFORMER",
            ElementType::ThreeWindingsTransformer => "THREE_WINDINGS_TRANSFORMER",
            ElementType::Branch => "BRANCH",
            ElementType::ShuntCompensator => "SHUNT_COMPENSATOR",
            ElementType::StaticVarCompensator => "STATIC_VAR_COMPENSATOR",
            ElementType::BusbarSection => "BUSBAR_SECTION",
            ElementType::HvdcLine => "HVDC_LINE",
            ElementType::Other(raw) => raw.as_str(),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ElementType::Other(_))
    }

    /// Attribute expectations on the element in the final state.
    pub fn final_state_policy(&self) -> FinalStatePolicy {
        match self {
            ElementType::BusbarSection | ElementType::HvdcLine => {
                FinalStatePolicy::Absent(&["p", "q", "p1", "p2", "q1", "q2"])
            }
            ElementType::Load | ElementType::Generator | ElementType::DanglingLine => {
                FinalStatePolicy::Zero(&["p", "q"])
            }
            ElementType::Line | ElementType::Branch | ElementType::TwoWindingsTransformer => {
                FinalStatePolicy::Zero(&["p1", "p2", "q1", "q2"])
            }
            ElementType::ThreeWindingsTransformer => {
                FinalStatePolicy::Zero(&["p1", "p2", "p3", "q1", "q2", "q3"])
            }
            ElementType::ShuntCompensator | ElementType::StaticVarCompensator => {
                FinalStatePolicy::Zero(&["q"])
            }
            ElementType::Other(_) => FinalStatePolicy::Unchecked,
        }
    }
}

impl From<&str> for ElementType {
    fn from(raw: &str) -> Self {
        match raw {
            "LOAD" => ElementType::Load,
            "GENERATOR" => ElementType::Generator,
            "DANGLING_LINE" => ElementType::DanglingLine,
            "LINE" => ElementType::Line,
            "TWO_WINDINGS_TRANSFORMER" => ElementType::TwoWindingsTransformer,
            "THREE_WINDINGS_TRANSFORMER" => ElementType::ThreeWindingsTransformer,
            "BRANCH" => ElementType::Branch,
            "SHUNT_COMPENSATOR" => ElementType::ShuntCompensator,
            "STATIC_VAR_COMPENSATOR" => ElementType::StaticVarCompensator,
            "BUSBAR_SECTION" => ElementType::BusbarSection,
            "HVDC_LINE" => ElementType::HvdcLine,
            other => ElementType::Other(other.to_string()),
        }
    }
}

impl From<String> for ElementType {
    fn from(raw: String) -> Self {
        ElementType::from(raw.as_str())
    }
}

impl From<ElementType> for String {
    fn from(kind: ElementType) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the final state must show for a disconnected element.
///
/// Zero means the literal strings `"0"` or `"-0"`; the simulator prints a
/// disconnected element's flows that way and any other spelling (`"0.0"`)
/// is a different value as far as this check is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalStatePolicy {
    /// None of these attributes may be present.
    Absent(&'static [&'static str]),
    /// Every attribute must be present and a literal signed zero.
    Zero(&'static [&'static str]),
    /// Finding the element is enough.
    Unchecked,
}

pub const ZERO_LITERALS: [&str; 2] = ["0", "-0"];

pub fn is_strict_zero(value: &str) -> bool {
    ZERO_LITERALS.contains(&value)
}

/// A grid element affected by a contingency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ElementType,
}

impl Element {
    pub fn new(id: impl Into<String>, kind: ElementType) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }

    /// Evidence keys to look for in model, parameter and timeline artifacts.
    pub fn expand(&self) -> Vec<EvidenceKey> {
        match self.kind {
            ElementType::ThreeWindingsTransformer => (1..=3)
                .map(|winding| EvidenceKey {
                    id: format!("{}_{}", self.id, winding),
                    kind: ElementType::TwoWindingsTransformer,
                })
                .collect(),
            _ => vec![EvidenceKey {
                id: self.id.clone(),
                kind: self.kind.clone(),
            }],
        }
    }

    /// Key used against the final state, which keeps composite ids.
    pub fn final_state_key(&self) -> EvidenceKey {
        EvidenceKey {
            id: self.id.clone(),
            kind: self.kind.clone(),
        }
    }
}

/// `(id, type)` pair a matcher searches an artifact for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EvidenceKey {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ElementType,
}

impl EvidenceKey {
    pub fn new(id: impl Into<String>, kind: ElementType) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }

    /// Identifier of the disconnection event model/parameter set.
    pub fn disconnect_id(&self) -> String {
        format!("Disconnect_{}", self.id)
    }
}

impl fmt::Display for EvidenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contingency {
    pub id: String,
    pub elements: Vec<Element>,
}

impl Contingency {
    pub fn new(id: impl Into<String>, elements: Vec<Element>) -> Self {
        Self {
            id: id.into(),
            elements,
        }
    }
}
