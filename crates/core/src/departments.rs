//! Dashboard departments.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// All valid department strings, in the order they are presented to clients.
pub const VALID_DEPARTMENTS: &[&str] = &["FINANCE", "SALES", "MARKETING", "GENERAL", "OTHER", "HR"];

/// The business area a dashboard belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Department {
    Finance,
    Sales,
    Marketing,
    General,
    Other,
    Hr,
}

impl Department {
    pub fn as_str(self) -> &'static str {
        match self {
            Department::Finance => "FINANCE",
            Department::Sales => "SALES",
            Department::Marketing => "MARKETING",
            Department::General => "GENERAL",
            Department::Other => "OTHER",
            Department::Hr => "HR",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Department {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FINANCE" => Ok(Department::Finance),
            "SALES" => Ok(Department::Sales),
            "MARKETING" => Ok(Department::Marketing),
            "GENERAL" => Ok(Department::General),
            "OTHER" => Ok(Department::Other),
            "HR" => Ok(Department::Hr),
            _ => Err("Invalid or missing department".to_string()),
        }
    }
}

/// Parse an optional, client-supplied department.
///
/// A missing value is rejected with the same message as an unknown one.
pub fn parse_department(value: Option<&str>) -> Result<Department, String> {
    value
        .ok_or_else(|| "Invalid or missing department".to_string())?
        .parse()
}
