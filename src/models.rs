use crate::model::role::Role;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct RegisterReq {
    #[schema(example = "Budi Santoso")]
    pub nama: String,
    #[schema(example = "budi@kampus.ac.id")]
    pub email: String,
    #[schema(example = "rahasia123")]
    pub password: String,
    /// Defaults to `mahasiswa` when omitted
    pub role: Option<Role>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "budi@kampus.ac.id")]
    pub email: String,
    #[schema(example = "rahasia123")]
    pub password: String,
}

#[derive(FromRow)]
pub struct UserSql {
    pub id: u64, // matches BIGINT UNSIGNED
    pub nama: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    pub sub: String, // email
    pub nama: String,
    pub role: Role,
    pub exp: usize,
    pub jti: String,

    pub token_type: TokenType,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}
