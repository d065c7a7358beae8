use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;

/// The four fixed buckets a user's files are sorted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Study,
    Labs,
    Syllabus,
    Tests,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Study,
        Category::Labs,
        Category::Syllabus,
        Category::Tests,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Study => "study",
            Category::Labs => "labs",
            Category::Syllabus => "syllabus",
            Category::Tests => "tests",
        }
    }

    /// Maps any unrecognised value to the default category.
    pub fn normalize(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// The authenticated user attached to a request by the session middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i32,
    pub username: String,
}
