use std::time::{SystemTime, UNIX_EPOCH};

use crate::model::role::Role;
use crate::models::{Claims, TokenType};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

pub fn generate_access_token(
    user_id: u64,
    email: String,
    nama: String,
    role: Role,
    secret: &str,
    ttl: usize,
) -> String {
    let claims = Claims {
        user_id,
        sub: email,
        nama,
        role,
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
        token_type: TokenType::Access,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

pub fn generate_refresh_token(
    user_id: u64,
    email: String,
    nama: String,
    role: Role,
    secret: &str,
    ttl: usize,
) -> (String, Claims) {
    let claims = Claims {
        user_id,
        sub: email,
        nama,
        role,
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
        token_type: TokenType::Refresh,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap();

    (token, claims)
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn access_token_round_trips() {
        let token = generate_access_token(
            7,
            "budi@kampus.ac.id".to_string(),
            "Budi".to_string(),
            Role::Mahasiswa,
            SECRET,
            900,
        );

        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.sub, "budi@kampus.ac.id");
        assert_eq!(claims.nama, "Budi");
        assert_eq!(claims.role, Role::Mahasiswa);
        assert_eq!(claims.token_type, TokenType::Access);
    }

    #[test]
    fn token_with_wrong_secret_is_rejected() {
        let token = generate_access_token(
            7,
            "budi@kampus.ac.id".to_string(),
            "Budi".to_string(),
            Role::Mahasiswa,
            SECRET,
            900,
        );
        assert!(verify_token(&token, "other-secret").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = Claims {
            user_id: 7,
            sub: "budi@kampus.ac.id".to_string(),
            nama: "Budi".to_string(),
            role: Role::Mahasiswa,
            exp: now() - 3600,
            jti: Uuid::new_v4().to_string(),
            token_type: TokenType::Access,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(verify_token(&token, SECRET).is_err());
    }

    #[test]
    fn refresh_token_carries_refresh_type() {
        let (token, issued) = generate_refresh_token(
            7,
            "budi@kampus.ac.id".to_string(),
            "Budi".to_string(),
            Role::Admin,
            SECRET,
            604800,
        );
        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(claims.token_type, TokenType::Refresh);
        assert_eq!(claims.jti, issued.jti);
    }
}
