//! Reduction of stored role strings to canonical roles.
//!
//! Stored role strings are free text, and several of them are templated per
//! kingdom (`"Cidadão de Gápenver"`). Reduction applies [`PREFIX_RULES`] in
//! order (first match wins), then falls back to the first whitespace token.

use serde::{Deserialize, Serialize};

use crate::decision::PermissionError;
use crate::hierarchy::Role;

/// Ordered prefix rules. Prefixes are lowercase and compared against the
/// lowercased input.
pub const PREFIX_RULES: &[(&str, Role)] = &[
    ("cidadão de", Role::Cidadao),
    ("guardião de", Role::Guardiao),
    ("veterano de", Role::Veterano),
    ("administrador", Role::Admin),
    ("luminir", Role::OficialReal),
    ("mehalkir", Role::GuardaReal),
    ("autor", Role::Autor),
];

/// Canonicalize an optional role string. `None` is [`Role::Unknown`].
#[must_use]
pub fn canonicalize(role: Option<&str>) -> Role {
    role.map_or(Role::Unknown, canonicalize_str)
}

/// Canonicalize a role string. Never fails: anything unrecognised is
/// [`Role::Unknown`].
#[must_use]
pub fn canonicalize_str(role: &str) -> Role {
    let lowered = role.trim().to_lowercase();
    if lowered.is_empty() {
        return Role::Unknown;
    }

    if let Some((_, role)) = PREFIX_RULES
        .iter()
        .find(|(prefix, _)| lowered.starts_with(*prefix))
    {
        return *role;
    }

    lowered
        .split_whitespace()
        .next()
        .and_then(Role::from_canonical)
        .unwrap_or(Role::Unknown)
}

/// Canonicalize a role string the caller expects to name a known role.
///
/// Fails with [`PermissionError::UnknownRole`] when the input falls back to
/// `default` without literally being `"default"`. This is a validation
/// warning for the caller; evaluation itself never needs it.
pub fn expect_known_role(role: &str) -> Result<Role, PermissionError> {
    let canonical = canonicalize_str(role);
    if canonical == Role::Unknown && !role.trim().eq_ignore_ascii_case(Role::Unknown.as_str()) {
        tracing::warn!(raw = %role, "Role string did not match any known role");
        return Err(PermissionError::UnknownRole {
            raw: role.to_string(),
        });
    }
    Ok(canonical)
}

/// Raw role text as stored against a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleString(String);

impl RoleString {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Stored form for `role`. Kingdom-bound roles are templated as
    /// `"<Title> de <Kingdom>"` when a non-empty kingdom is given; `default`
    /// is stored as its canonical id.
    #[must_use]
    pub fn for_role(role: Role, kingdom: Option<&str>) -> Self {
        if role == Role::Unknown {
            return Self(role.as_str().to_string());
        }
        match kingdom.map(str::trim).filter(|k| !k.is_empty()) {
            Some(kingdom) if role.is_kingdom_bound() => {
                Self(format!("{} de {kingdom}", role.display_name()))
            }
            _ => Self(role.display_name().to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn canonical(&self) -> Role {
        canonicalize_str(&self.0)
    }

    /// Kingdom named by a templated role string, if any.
    #[must_use]
    pub fn kingdom(&self) -> Option<&str> {
        if !self.canonical().is_kingdom_bound() {
            return None;
        }
        let trimmed = self.0.trim();
        // " de " is ASCII, so a matching window always starts on a char boundary.
        let at = trimmed
            .as_bytes()
            .windows(4)
            .position(|w| w.eq_ignore_ascii_case(b" de "))?;
        let kingdom = trimmed[at + 4..].trim();
        (!kingdom.is_empty()).then_some(kingdom)
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for RoleString {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for RoleString {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl std::fmt::Display for RoleString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
