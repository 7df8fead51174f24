//! Macro for implementing Display and FromStr for named binding enums
//!
//! Bindings are enums selected by name from configuration (presenter kinds,
//! for instance). The macro generates a single source of truth for the
//! name of every variant so that parse errors can list what is available.
//!
//! # Example
//!
//! ```rust
//! use meetbell_domain::impl_binding_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Transport {
//!     Http,
//!     File,
//! }
//!
//! impl_binding_conversions!(Transport {
//!     Http => "http",
//!     File => "file",
//! });
//!
//! assert_eq!("http".parse::<Transport>().unwrap(), Transport::Http);
//! assert_eq!(Transport::names(), &["http", "file"]);
//! ```

/// Error returned when a binding name does not match any variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no such {kind} {name:?}, choose one of {available:?}")]
pub struct UnknownBinding {
    /// Human readable binding category (the enum name).
    pub kind: &'static str,
    /// The name that failed to parse.
    pub name: String,
    /// Every accepted name.
    pub available: Vec<&'static str>,
}

/// Implements Display, FromStr and a `names()` listing for binding enums
///
/// - Display renders the configured name
/// - FromStr is case-insensitive and fails with [`UnknownBinding`]
/// - `ALL` and `names()` enumerate variants in declaration order
#[macro_export]
macro_rules! impl_binding_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$enum_name] = &[$(Self::$variant),+];

            /// Configuration name of every variant, in declaration order.
            #[must_use]
            pub const fn names() -> &'static [&'static str] {
                &[$($str),+]
            }

            /// Configuration name of this variant.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = $crate::macros::UnknownBinding;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err($crate::macros::UnknownBinding {
                        kind: stringify!($enum_name),
                        name: s.to_string(),
                        available: Self::names().to_vec(),
                    }),
                }
            }
        }
    };
}
