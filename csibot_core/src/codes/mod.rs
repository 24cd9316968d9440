//! # Host Enumeration Codes
//!
//! The host object model takes plain integers for unit systems, material
//! types, load-pattern types, directions and a few flags. This module maps the
//! human-readable labels onto those integers.
//!
//! Every code type is generated by the `host_codes!` macro and implements
//! [`HostCode`]. A code can be resolved from a [`CodeInput`], which is either an
//! integer (accepted when it is one of the table's codes) or a label (matched
//! exactly, case-sensitive). Anything else is a
//! [`BotError::UnrecognizedCode`](crate::errors::BotError::UnrecognizedCode).
//!
//! In JSON every code type accepts either form and serializes as its label:
//!
//! ```rust
//! use csibot_core::codes::{HostCode, UnitSystem};
//!
//! let a: UnitSystem = serde_json::from_str("\"kN_m_C\"").unwrap();
//! let b: UnitSystem = serde_json::from_str("6").unwrap();
//! assert_eq!(a, b);
//! assert_eq!(a.code(), 6);
//! assert_eq!(serde_json::to_string(&a).unwrap(), "\"kN_m_C\"");
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{BotError, BotResult};

/// Raw input to a code mapper: an integer code or a label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CodeInput {
    Code(i64),
    Label(String),
}

impl From<i32> for CodeInput {
    fn from(code: i32) -> Self {
        CodeInput::Code(i64::from(code))
    }
}

impl From<i64> for CodeInput {
    fn from(code: i64) -> Self {
        CodeInput::Code(code)
    }
}

impl From<&str> for CodeInput {
    fn from(label: &str) -> Self {
        CodeInput::Label(label.to_string())
    }
}

impl From<String> for CodeInput {
    fn from(label: String) -> Self {
        CodeInput::Label(label)
    }
}

impl From<&String> for CodeInput {
    fn from(label: &String) -> Self {
        CodeInput::Label(label.clone())
    }
}

impl std::fmt::Display for CodeInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodeInput::Code(c) => write!(f, "{}", c),
            CodeInput::Label(l) => write!(f, "{}", l),
        }
    }
}

/// A host enumeration backed by a fixed label/code table.
pub trait HostCode: Copy + PartialEq + Sized + 'static {
    /// What the code describes, used in error messages ("units", "direction", ...)
    const KIND: &'static str;

    /// Every variant, in code order
    const ALL: &'static [Self];

    /// Integer the host expects
    fn code(self) -> i32;

    /// Canonical label
    fn label(self) -> &'static str;

    /// Look up a variant by its integer code
    fn from_code(code: i64) -> BotResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| i64::from(v.code()) == code)
            .ok_or_else(|| BotError::unrecognized(Self::KIND, code.to_string()))
    }

    /// Look up a variant by its exact label
    fn from_label(label: &str) -> BotResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.label() == label)
            .ok_or_else(|| BotError::unrecognized(Self::KIND, label))
    }

    /// Resolve an integer or label
    fn resolve(input: impl Into<CodeInput>) -> BotResult<Self> {
        match input.into() {
            CodeInput::Code(code) => Self::from_code(code),
            CodeInput::Label(label) => Self::from_label(&label),
        }
    }

    /// `(code, label)` rows in code order
    fn table() -> Vec<(i32, &'static str)> {
        Self::ALL.iter().map(|v| (v.code(), v.label())).collect()
    }
}

/// Generates a code enum, its [`HostCode`] table and the serde/`FromStr`
/// glue shared by every code type.
macro_rules! host_codes {
    (
        $(#[$meta:meta])*
        pub enum $name:ident : $kind:literal {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $code:literal => $label:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(try_from = "crate::codes::CodeInput", into = "crate::codes::CodeInput")]
        pub enum $name {
            $(
                $(#[$vmeta])*
                $variant
            ),+
        }

        impl crate::codes::HostCode for $name {
            const KIND: &'static str = $kind;
            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn code(self) -> i32 {
                match self {
                    $($name::$variant => $code),+
                }
            }

            fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl TryFrom<crate::codes::CodeInput> for $name {
            type Error = crate::errors::BotError;

            fn try_from(input: crate::codes::CodeInput) -> Result<Self, Self::Error> {
                <$name as crate::codes::HostCode>::resolve(input)
            }
        }

        impl From<$name> for crate::codes::CodeInput {
            fn from(value: $name) -> Self {
                crate::codes::CodeInput::Label(crate::codes::HostCode::label(value).to_string())
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::errors::BotError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$name as crate::codes::HostCode>::from_label(s)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", crate::codes::HostCode::label(*self))
            }
        }
    };
}

pub mod assignment;
pub mod direction;
pub mod load_pattern;
pub mod material;
pub mod units;

pub use assignment::{DistributedLoadType, ItemType};
pub use direction::{check_coordinate_system, validate_coordinate_system, CoordinateSystem, Direction};
pub use load_pattern::LoadPatternType;
pub use material::MaterialType;
pub use units::UnitSystem;
