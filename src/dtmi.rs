//! DTMI identifier conventions
//!
//! A Digital Twin Model Identifier is a case-sensitive, versioned string of
//! the form `dtmi:<segment>[:<segment>...];<version>`. Repository storage
//! paths are derived from the lowercased identifier, which is why retrieved
//! content must be re-checked for exact casing after fetch.
//!
//! Path mapping: `dtmi:com:example:Thermostat;1` becomes
//! `dtmi/com/example/thermostat-1.json`.

use crate::error::ResolverError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Anchored DTMI grammar: colon-separated segments starting with a letter,
/// ending with an alphanumeric, underscores allowed inside; version is
/// 1-9 digits with no leading zero.
static DTMI_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^dtmi:[A-Za-z](?:[A-Za-z0-9_]*[A-Za-z0-9])?(?::[A-Za-z](?:[A-Za-z0-9_]*[A-Za-z0-9])?)*;[1-9][0-9]{0,8}$",
    )
    .expect("DTMI grammar pattern is well-formed")
});

/// Check a string against the DTMI grammar. No partial matches.
///
/// # Examples
///
/// ```
/// use models_repository_sdk::dtmi::is_valid_dtmi;
///
/// assert!(is_valid_dtmi("dtmi:com:example:Thermostat;1"));
/// assert!(!is_valid_dtmi("dtmi:com:example:Thermostat"));
/// assert!(!is_valid_dtmi("dtmi:com:example:Thermostat;0"));
/// ```
pub fn is_valid_dtmi(value: &str) -> bool {
    !value.is_empty() && DTMI_PATTERN.is_match(value)
}

/// A validated Digital Twin Model Identifier.
///
/// Construction is the only place the grammar is checked; a `Dtmi` value is
/// syntactically valid by construction. Equality and ordering are exact,
/// case-sensitive string comparisons.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Dtmi(String);

impl Dtmi {
    /// Validate and wrap an identifier string.
    pub fn new(value: &str) -> Result<Self, ResolverError> {
        if is_valid_dtmi(value) {
            Ok(Self(value.to_owned()))
        } else {
            Err(ResolverError::InvalidDtmiFormat(value.to_owned()))
        }
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Repository-relative artifact path for this identifier.
    ///
    /// Lowercases the identifier, maps `:` to `/` and `;` to `-`, and
    /// appends `.json`. Storage layout is canonical-lowercase regardless of
    /// the identifier's declared casing.
    pub fn to_path(&self) -> String {
        format!(
            "{}.json",
            self.0.to_lowercase().replace(':', "/").replace(';', "-")
        )
    }

    /// Fully qualified artifact path under `base_path`.
    ///
    /// Joining is purely textual (exactly one `/` between base and relative
    /// path, no filesystem normalization) so local and remote bases behave
    /// identically. With `expanded`, the trailing `.json` suffix becomes
    /// `.expanded.json`.
    pub fn to_qualified_path(&self, base_path: &str, expanded: bool) -> String {
        let mut relative = self.to_path();
        if expanded {
            relative.truncate(relative.len() - ".json".len());
            relative.push_str(".expanded.json");
        }

        let mut qualified = String::with_capacity(base_path.len() + relative.len() + 1);
        qualified.push_str(base_path);
        if !base_path.ends_with('/') {
            qualified.push('/');
        }
        qualified.push_str(&relative);
        qualified
    }
}

impl fmt::Display for Dtmi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Dtmi {
    type Err = ResolverError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value)
    }
}

impl TryFrom<String> for Dtmi {
    type Error = ResolverError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Dtmi> for String {
    fn from(dtmi: Dtmi) -> Self {
        dtmi.0
    }
}

impl AsRef<str> for Dtmi {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Repository-relative path for a raw identifier string.
///
/// Fails with [`ResolverError::InvalidDtmiFormat`] when the input does not
/// match the grammar.
pub fn dtmi_to_path(dtmi: &str) -> Result<String, ResolverError> {
    Ok(Dtmi::new(dtmi)?.to_path())
}

/// Fully qualified artifact path for a raw identifier string.
pub fn dtmi_to_qualified_path(
    dtmi: &str,
    base_path: &str,
    expanded: bool,
) -> Result<String, ResolverError> {
    Ok(Dtmi::new(dtmi)?.to_qualified_path(base_path, expanded))
}
