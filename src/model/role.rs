use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Matches the `role` ENUM in the users table.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Mahasiswa,
    Admin,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn role_round_trips_through_db_strings() {
        assert_eq!(Role::Mahasiswa.to_string(), "mahasiswa");
        assert_eq!(Role::Admin.to_string(), "admin");
        assert_eq!(Role::from_str("admin").unwrap(), Role::Admin);
        assert_eq!(Role::from_str("mahasiswa").unwrap(), Role::Mahasiswa);
        assert!(Role::from_str("dosen").is_err());
    }
}
