use serde::Serialize;
use std::fmt;

/// Closed role set for the storefront
///
/// Gating logic treats roles as opaque codes compared against an
/// allow-list; there is no implicit hierarchy in the gate itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    User,
    Moderator,
    Admin,
    SuperAdmin,
}

impl UserRole {
    #[inline]
    pub const fn code(&self) -> &'static str {
        use UserRole::*;
        match self {
            User => "user",
            Moderator => "moderator",
            Admin => "admin",
            SuperAdmin => "super_admin",
        }
    }

    /// Parse a role code
    ///
    /// Returns `None` for unknown codes: a token carrying a role outside
    /// the closed set must fail verification, never panic.
    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        use UserRole::*;
        match code {
            "user" => Some(User),
            "moderator" => Some(Moderator),
            "admin" => Some(Admin),
            "super_admin" => Some(SuperAdmin),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_staff(&self) -> bool {
        use UserRole::*;
        matches!(self, Moderator | Admin | SuperAdmin)
    }

    #[inline]
    pub const fn is_admin_or_higher(&self) -> bool {
        use UserRole::*;
        matches!(self, Admin | SuperAdmin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
