//! Seeded User Store
//!
//! Demo stand-in for the storefront's user persistence. Implements the
//! guard's `UserStore` collaborator trait and additionally exposes
//! password digests to the login handler - the trait itself deliberately
//! never returns credentials.

use guard::GuardResult;
use guard::domain::{AccountRecord, UserId, UserRole, UserStore};
use platform::password::CredentialHasher;

struct SeedUser {
    account: AccountRecord,
    password_digest: String,
}

/// Read-only in-memory account set
pub struct SeedUserStore {
    users: Vec<SeedUser>,
}

impl SeedUserStore {
    /// Seed the demo accounts
    ///
    /// Digests are produced at startup with the active work factor, so
    /// production mode pays production hashing cost here too.
    pub fn seed(hasher: &CredentialHasher) -> anyhow::Result<Self> {
        let seeds: [(&str, &str, UserRole, bool); 4] = [
            ("shopper@example.com", "shopper-password-1", UserRole::User, false),
            ("mod@example.com", "moderator-password-1", UserRole::Moderator, false),
            ("admin@example.com", "admin-password-1", UserRole::Admin, false),
            ("blocked@example.com", "blocked-password-1", UserRole::User, true),
        ];

        let mut users = Vec::with_capacity(seeds.len());
        for (email, password, role, is_blocked) in seeds {
            let mut account = AccountRecord::new(UserId::new(), email, role);
            account.is_blocked = is_blocked;
            users.push(SeedUser {
                account,
                password_digest: hasher
                    .hash(password)
                    .map_err(|e| anyhow::anyhow!("Failed to seed {email}: {e}"))?,
            });
        }

        tracing::info!(accounts = users.len(), "Seeded demo user store");
        Ok(Self { users })
    }

    /// Account plus stored digest, for the login handler only
    pub fn credentials_by_email(&self, email: &str) -> Option<(AccountRecord, String)> {
        self.users
            .iter()
            .find(|u| u.account.email == email)
            .map(|u| (u.account.clone(), u.password_digest.clone()))
    }
}

impl UserStore for SeedUserStore {
    async fn find_by_id(&self, user_id: &UserId) -> GuardResult<Option<AccountRecord>> {
        Ok(self
            .users
            .iter()
            .find(|u| &u.account.user_id == user_id)
            .map(|u| u.account.clone()))
    }

    async fn find_by_email(&self, email: &str) -> GuardResult<Option<AccountRecord>> {
        Ok(self
            .users
            .iter()
            .find(|u| u.account.email == email)
            .map(|u| u.account.clone()))
    }
}
