/// Shared interface of the configuration-selected surface schemes.
///
/// Each parameterization (albedo, roughness) is a closed set of named
/// methods. The name is resolved once when the configuration is read; the
/// per-timestep code only ever sees the enum.
use crate::error::{GridError, GridResult};

pub trait SchemeMethod: Sized + Copy + PartialEq + 'static {
    /// Configuration key reported when a name is rejected.
    const KEY: &'static str;

    /// Every supported method, in canonical order.
    fn all() -> &'static [Self];

    /// Name as written in configuration files.
    fn name(self) -> &'static str;

    /// Resolve a configured name.
    fn from_name(name: &str) -> GridResult<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|m| m.name() == name)
            .ok_or_else(|| {
                let allowed: Vec<&str> = Self::all().iter().map(|m| m.name()).collect();
                GridError::invalid_config(
                    Self::KEY,
                    name,
                    format!("must be one of {}", allowed.join(", ")),
                )
            })
    }
}

/// String conversions for a [`SchemeMethod`] enum, so that serde reads and
/// writes it by name.
macro_rules! impl_scheme_conversions {
    ($ty:ty) => {
        impl std::str::FromStr for $ty {
            type Err = $crate::error::GridError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty as $crate::traits::SchemeMethod>::from_name(s)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::traits::SchemeMethod::name(*self))
            }
        }

        impl TryFrom<String> for $ty {
            type Error = $crate::error::GridError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                s.parse()
            }
        }

        impl From<$ty> for String {
            fn from(m: $ty) -> String {
                $crate::traits::SchemeMethod::name(m).to_string()
            }
        }
    };
}

pub(crate) use impl_scheme_conversions;
