//! Identity Model

use serde::{Deserialize, Serialize};

/// Canonical user. At most one identity per verified phone (UNIQUE on
/// `phone`); rows without a phone are guests created by OTP login or the
/// bot layer and become verified only through the merge path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Identity {
    pub id: i64,
    pub phone: Option<String>,
    pub display_name: String,
    pub username: Option<String>,
    pub language: String,
    pub last_active_store_id: Option<i64>,
    pub last_seen: i64,
}

/// Verified/guest split, derived from the phone column.
///
/// This replaces ad hoc ID prefix conventions: code that cares whether an
/// identity is contactable matches on the variant, and the only way a
/// guest gains a phone is the identity merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityKind<'a> {
    Verified(&'a str),
    Guest,
}

impl Identity {
    pub fn kind(&self) -> IdentityKind<'_> {
        match self.phone.as_deref() {
            Some(phone) => IdentityKind::Verified(phone),
            None => IdentityKind::Guest,
        }
    }

    pub fn is_verified(&self) -> bool {
        self.phone.is_some()
    }
}

/// Profile fields carried by sync / contact events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityProfile {
    pub display_name: String,
    pub username: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// Search result row (collaborator picker).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct IdentitySummary {
    pub id: i64,
    pub display_name: String,
    pub username: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_phone_column() {
        let mut id = Identity {
            id: 1,
            phone: None,
            display_name: "User 4455".into(),
            username: None,
            language: "tg".into(),
            last_active_store_id: None,
            last_seen: 0,
        };
        assert_eq!(id.kind(), IdentityKind::Guest);
        id.phone = Some("992900112233".into());
        assert_eq!(id.kind(), IdentityKind::Verified("992900112233"));
    }
}
