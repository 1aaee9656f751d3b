//! Role hierarchy table.
//!
//! One shared rank table for every handler. Lower rank = more authority:
//!
//! | role          | rank |
//! |---------------|------|
//! | `autor`       | 0    |
//! | `admin`       | 1    |
//! | `oficialreal` | 2    |
//! | `guardareal`  | 3    |
//! | `veterano`    | 10   |
//! | `guardião`    | 11   |
//! | `cidadão`     | 12   |
//! | `viajante`    | 13   |
//! | `banido`      | 98   |
//! | `default`     | 99   |

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Version of the rank table below. Bump whenever a rank changes.
pub const RANK_TABLE_VERSION: u32 = 1;

/// Canonical role.
///
/// Serialized as the canonical identifier (`"autor"`, `"guardião"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Role {
    /// Top authority. Immune to every mutation.
    #[serde(rename = "autor")]
    Autor,
    /// Platform administrator.
    #[serde(rename = "admin")]
    Admin,
    /// Royal officer ("Luminir").
    #[serde(rename = "oficialreal")]
    OficialReal,
    /// Royal guard ("Mehalkir").
    #[serde(rename = "guardareal")]
    GuardaReal,
    #[serde(rename = "veterano")]
    Veterano,
    #[serde(rename = "guardião")]
    Guardiao,
    #[serde(rename = "cidadão")]
    Cidadao,
    #[serde(rename = "viajante")]
    Viajante,
    /// Suspended or restricted account.
    #[serde(rename = "banido")]
    Banido,
    /// Unknown or unset role. Canonical id `default`.
    #[default]
    #[serde(rename = "default")]
    Unknown,
}

impl Role {
    /// Every role, strongest first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Autor,
            Self::Admin,
            Self::OficialReal,
            Self::GuardaReal,
            Self::Veterano,
            Self::Guardiao,
            Self::Cidadao,
            Self::Viajante,
            Self::Banido,
            Self::Unknown,
        ]
    }

    /// Rank in the hierarchy (lower number = more authority).
    #[must_use]
    pub const fn rank(self) -> i32 {
        match self {
            Self::Autor => 0,
            Self::Admin => 1,
            Self::OficialReal => 2,
            Self::GuardaReal => 3,
            Self::Veterano => 10,
            Self::Guardiao => 11,
            Self::Cidadao => 12,
            Self::Viajante => 13,
            Self::Banido => 98,
            Self::Unknown => 99,
        }
    }

    /// Canonical identifier, identical to the serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Autor => "autor",
            Self::Admin => "admin",
            Self::OficialReal => "oficialreal",
            Self::GuardaReal => "guardareal",
            Self::Veterano => "veterano",
            Self::Guardiao => "guardião",
            Self::Cidadao => "cidadão",
            Self::Viajante => "viajante",
            Self::Banido => "banido",
            Self::Unknown => "default",
        }
    }

    /// Look up a role by its exact canonical identifier.
    #[must_use]
    pub fn from_canonical(id: &str) -> Option<Self> {
        Self::all().iter().copied().find(|r| r.as_str() == id)
    }

    /// In-world title used when rendering a stored role string.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Autor => "Autor",
            Self::Admin => "Administrador",
            Self::OficialReal => "Luminir",
            Self::GuardaReal => "Mehalkir",
            Self::Veterano => "Veterano",
            Self::Guardiao => "Guardião",
            Self::Cidadao => "Cidadão",
            Self::Viajante => "Viajante",
            Self::Banido => "Banido",
            Self::Unknown => "Desconhecido",
        }
    }

    /// Roles stored as `"<Title> de <Kingdom>"`.
    #[must_use]
    pub const fn is_kingdom_bound(self) -> bool {
        matches!(self, Self::Veterano | Self::Guardiao | Self::Cidadao)
    }

    /// Strictly more authority than `other`. Used for every mutation.
    #[must_use]
    pub const fn outranks(self, other: Self) -> bool {
        self.rank() < other.rank()
    }

    /// Same or more authority than `other`. Used only for listings.
    #[must_use]
    pub const fn outranks_or_equals(self, other: Self) -> bool {
        self.rank() <= other.rank()
    }

    /// Single-role set.
    #[must_use]
    pub const fn flag(self) -> RoleSet {
        match self {
            Self::Autor => RoleSet::AUTOR,
            Self::Admin => RoleSet::ADMIN,
            Self::OficialReal => RoleSet::OFICIAL_REAL,
            Self::GuardaReal => RoleSet::GUARDA_REAL,
            Self::Veterano => RoleSet::VETERANO,
            Self::Guardiao => RoleSet::GUARDIAO,
            Self::Cidadao => RoleSet::CIDADAO,
            Self::Viajante => RoleSet::VIAJANTE,
            Self::Banido => RoleSet::BANIDO,
            Self::Unknown => RoleSet::UNKNOWN,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// A set of canonical roles, one bit per role.
    ///
    /// Serialized as a list of canonical identifiers in rank order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RoleSet: u16 {
        const AUTOR        = 1 << 0;
        const ADMIN        = 1 << 1;
        const OFICIAL_REAL = 1 << 2;
        const GUARDA_REAL  = 1 << 3;
        const VETERANO     = 1 << 4;
        const GUARDIAO     = 1 << 5;
        const CIDADAO      = 1 << 6;
        const VIAJANTE     = 1 << 7;
        const BANIDO       = 1 << 8;
        const UNKNOWN      = 1 << 9;
    }
}

impl RoleSet {
    /// Build a set from individual roles.
    #[must_use]
    pub fn from_roles(roles: &[Role]) -> Self {
        roles
            .iter()
            .fold(Self::empty(), |set, role| set | role.flag())
    }

    #[must_use]
    pub const fn contains_role(self, role: Role) -> bool {
        self.contains(role.flag())
    }

    /// Members of the set, strongest first.
    pub fn iter_roles(self) -> impl Iterator<Item = Role> {
        Role::all()
            .iter()
            .copied()
            .filter(move |role| self.contains_role(*role))
    }
}

impl Serialize for RoleSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter_roles())
    }
}

impl<'de> Deserialize<'de> for RoleSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let roles = Vec::<Role>::deserialize(deserializer)?;
        Ok(Self::from_roles(&roles))
    }
}
