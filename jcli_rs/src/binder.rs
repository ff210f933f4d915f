//! Conversion from raw string tokens into typed field values.
//!
//! The binding loop never parses values itself: every argument spec carries a
//! closure built from a [`BindValue`] impl, so new field types plug in by
//! implementing the trait. `Option<T>` strips the wrapper, binds the bare
//! value, and rewraps; its presence also marks the argument optional.

use std::path::PathBuf;

use thiserror::Error;

/// Failure produced by a value conversion or an attached validator.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct BindError(pub String);

impl BindError {
    pub fn new(message: impl Into<String>) -> Self {
        BindError(message.into())
    }
}

/// A field type that can be bound from one raw argument word.
pub trait BindValue: Sized + 'static {
    /// True when the argument takes no value word (`-x` alone means true).
    const BOOLEAN: bool = false;
    /// True when omitting the argument is not an error.
    const OPTIONAL: bool = false;

    fn bind_value(raw: &str) -> Result<Self, BindError>;
}

macro_rules! bind_via_from_str {
    ($($ty:ty => $what:literal),+ $(,)?) => {
        $(impl BindValue for $ty {
            fn bind_value(raw: &str) -> Result<Self, BindError> {
                raw.parse::<$ty>()
                    .map_err(|_| BindError(format!("'{}' is not a valid {}", raw, $what)))
            }
        })+
    };
}

bind_via_from_str! {
    i8 => "integer", i16 => "integer", i32 => "integer", i64 => "integer",
    i128 => "integer", isize => "integer",
    u8 => "integer", u16 => "integer", u32 => "integer", u64 => "integer",
    u128 => "integer", usize => "integer",
    f32 => "number", f64 => "number",
    char => "character",
}

impl BindValue for String {
    fn bind_value(raw: &str) -> Result<Self, BindError> {
        Ok(raw.to_string())
    }
}

impl BindValue for PathBuf {
    fn bind_value(raw: &str) -> Result<Self, BindError> {
        Ok(PathBuf::from(raw))
    }
}

impl BindValue for bool {
    const BOOLEAN: bool = true;

    fn bind_value(raw: &str) -> Result<Self, BindError> {
        match raw {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(BindError(format!(
                "'{}' is not a valid boolean (expected true or false)",
                other
            ))),
        }
    }
}

impl<T: BindValue> BindValue for Option<T> {
    const BOOLEAN: bool = T::BOOLEAN;
    const OPTIONAL: bool = true;

    fn bind_value(raw: &str) -> Result<Self, BindError> {
        T::bind_value(raw).map(Some)
    }
}
