//! Common API types and utilities

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::{IntoParams, ToSchema};

use crate::shared::error::{ApiError, Result};

mod lenient_number {
    use serde::{Deserialize, Deserializer};

    /// Numbers may arrive as JSON numbers or strings. Anything unparseable is
    /// treated as absent so paging falls back to its defaults.
    pub fn deserialize_i64_opt<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum StringOrNum {
            Num(i64),
            Str(String),
        }

        Ok(match Option::<StringOrNum>::deserialize(deserializer)? {
            Some(StringOrNum::Num(n)) => Some(n),
            Some(StringOrNum::Str(s)) => s.trim().parse().ok(),
            None => None,
        })
    }
}

/// Offset pagination parameters
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// 1-based page number (values below 1 mean 1)
    #[serde(default, deserialize_with = "lenient_number::deserialize_i64_opt")]
    pub page: Option<i64>,

    /// Items per page, clamped to 1..=100 (default 20)
    #[serde(default, deserialize_with = "lenient_number::deserialize_i64_opt")]
    pub limit: Option<i64>,
}

/// Keyset pagination parameters
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CursorParams {
    /// Opaque cursor from a previous page's `nextCursor`
    pub cursor: Option<String>,

    /// Items per page, clamped to 1..=100 (default 20)
    #[serde(default, deserialize_with = "lenient_number::deserialize_i64_opt")]
    pub size: Option<i64>,
}

impl CursorParams {
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }
}

/// Single-entity envelope: `{ success, message?, data }`
#[derive(Debug, Serialize, ToSchema)]
pub struct DataResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data,
        }
    }
}

/// Success response with optional message
#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SuccessResponse {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }
}

/// Reject missing or blank required text, returning it trimmed.
pub fn require_text(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// Reject values outside `min..=max`.
pub fn require_range<T>(field: &str, value: T, min: T, max: T) -> Result<T>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if value < min || value > max {
        return Err(ApiError::validation(format!(
            "{} must be between {} and {}",
            field, min, max
        )));
    }
    Ok(value)
}

/// Reject values below `min`.
pub fn require_at_least<T>(field: &str, value: T, min: T) -> Result<T>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if value < min {
        return Err(ApiError::validation(format!("{} must be at least {}", field, min)));
    }
    Ok(value)
}

/// Tri-state update field.
///
/// Use with `#[serde(default)]`: a missing key stays `Absent`, JSON `null`
/// becomes `Null` and any other value becomes `Value`.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch<T> {
    Absent,
    Null,
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Patch::Value(value),
            None => Patch::Null,
        })
    }
}

/// `Value` writes the value; `Absent` and `Null` both write `null`.
impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Patch::Value(value) => serializer.serialize_some(value),
            Patch::Absent | Patch::Null => serializer.serialize_none(),
        }
    }
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    /// Write the patch into a nullable field.
    pub fn apply_to(self, target: &mut Option<T>) {
        match self {
            Patch::Absent => {}
            Patch::Null => *target = None,
            Patch::Value(value) => *target = Some(value),
        }
    }
}
