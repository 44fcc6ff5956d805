use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Target application category. Each platform owns a subdirectory of the reference
/// repository and one guideline document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Backend,
    Frontend,
    Mobile,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Backend, Platform::Frontend, Platform::Mobile];

    /// Directory name inside the boilerplates tree, also used in resource URIs.
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Backend => "backend",
            Platform::Frontend => "frontend",
            Platform::Mobile => "mobile",
        }
    }

    /// Human-readable name used for headings.
    pub fn title(self) -> &'static str {
        match self {
            Platform::Backend => "Backend",
            Platform::Frontend => "Frontend",
            Platform::Mobile => "Mobile",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| AppError::UnknownPlatform(s.to_string()))
    }
}

/// A search hit: the 1-based line number of the matching line and the surrounding lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchWindow {
    pub line_number: usize,
    pub context: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_platform_names_case_insensitively() {
        assert_eq!("backend".parse::<Platform>().unwrap(), Platform::Backend);
        assert_eq!(" Frontend ".parse::<Platform>().unwrap(), Platform::Frontend);
        assert_eq!("MOBILE".parse::<Platform>().unwrap(), Platform::Mobile);
    }

    #[test]
    fn rejects_unknown_platform() {
        let err = "desktop".parse::<Platform>().unwrap_err();
        assert!(matches!(err, AppError::UnknownPlatform(ref p) if p == "desktop"));
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Platform::Mobile).unwrap();
        assert_eq!(json, r#""mobile""#);
        let parsed: Platform = serde_json::from_str(r#""backend""#).unwrap();
        assert_eq!(parsed, Platform::Backend);
        assert!(serde_json::from_str::<Platform>(r#""desktop""#).is_err());
    }
}
