//! # Constraint Catalog
//!
//! Static metadata describing the constraints a schema kind accepts, so
//! tooling can list them (and their parameters) without building a schema.

use std::fmt;

use serde::Serialize;

/// Shape of a constraint parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// Any JSON number.
    Number,
    /// A non-negative integer.
    Integer,
    /// A string.
    String,
    /// An array of strings.
    StringList,
    /// A regular expression source string.
    Pattern,
    /// A map of property name to schema descriptor.
    Properties,
}

impl ParamKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Integer => "integer",
            Self::String => "string",
            Self::StringList => "string_list",
            Self::Pattern => "pattern",
            Self::Properties => "properties",
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parameter of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ParamDescriptor {
    /// Parameter name as it appears in the test's params.
    pub name: &'static str,
    /// Expected shape.
    pub kind: ParamKind,
}

impl ParamDescriptor {
    pub const fn new(name: &'static str, kind: ParamKind) -> Self {
        Self { name, kind }
    }
}

/// A constraint available on a schema kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstraintDescriptor {
    /// The registered kind the constraint belongs to, e.g. `"integer"`.
    pub type_name: String,
    /// Constraint name, e.g. `"lessThan"`.
    pub name: &'static str,
    /// Parameters, empty for flag-style constraints.
    pub params: &'static [ParamDescriptor],
}

impl ConstraintDescriptor {
    /// Whether the constraint takes no argument (`name: true` in descriptors).
    pub fn is_flag(&self) -> bool {
        self.params.is_empty()
    }
}

/// Constraints every kind shares.
pub const SHARED_CONSTRAINTS: &[&str] = &["required", "optional", "nullable"];

/// Build descriptors for the shared constraints of a kind.
pub fn shared_catalog(type_name: &str) -> Vec<ConstraintDescriptor> {
    SHARED_CONSTRAINTS
        .iter()
        .map(|&name| ConstraintDescriptor {
            type_name: type_name.to_string(),
            name,
            params: &[],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_catalog_is_flag_only() {
        let shared = shared_catalog("boolean");
        let names: Vec<&str> = shared.iter().map(|c| c.name).collect();
        assert_eq!(names, ["required", "optional", "nullable"]);
        assert!(shared.iter().all(ConstraintDescriptor::is_flag));
        assert!(shared.iter().all(|c| c.type_name == "boolean"));
    }

    #[test]
    fn param_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ParamKind::StringList).unwrap();
        assert_eq!(json, "\"string_list\"");
        assert_eq!(ParamKind::StringList.to_string(), "string_list");
    }
}
