use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use anyhow::Context;
use rand::rngs::OsRng;
use tracing::error;

use crate::config::PasswordConfig;

/// Argon2id hasher with a fixed cost, shared by create and update.
#[derive(Debug, Clone)]
pub struct Hasher {
    cost: u32,
    memory_kib: u32,
}

impl Hasher {
    pub fn new(config: &PasswordConfig) -> Self {
        Self {
            cost: config.cost,
            memory_kib: config.memory_kib,
        }
    }

    fn argon2(&self) -> anyhow::Result<Argon2<'static>> {
        let params = Params::new(self.memory_kib, self.cost, Params::DEFAULT_P_COST, None)
            .map_err(|e| {
                error!(error = %e, cost = self.cost, memory_kib = self.memory_kib, "argon2 params error");
                anyhow::anyhow!(e.to_string())
            })?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    pub fn hash(&self, plain: &str) -> anyhow::Result<String> {
        if plain.is_empty() {
            anyhow::bail!("refusing to hash an empty password");
        }
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()?
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                anyhow::anyhow!(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    /// A mismatch is `Ok(false)`; only an unparsable digest is an error.
    pub fn verify(&self, plain: &str, hash: &str) -> anyhow::Result<bool> {
        let parsed = PasswordHash::new(hash).map_err(|e| {
            error!(error = %e, "argon2 parse hash error");
            anyhow::anyhow!(e.to_string())
        })?;
        // Cost parameters come from the digest itself.
        Ok(Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok())
    }

    /// Runs [`Hasher::hash`] on the blocking pool so Argon2 does not stall
    /// the async workers.
    pub async fn spawn_hash(&self, plain: String) -> anyhow::Result<String> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&plain))
            .await
            .context("password hash task failed")?
    }

    pub async fn spawn_verify(&self, plain: String, hash: String) -> anyhow::Result<bool> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&plain, &hash))
            .await
            .context("password verify task failed")?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> Hasher {
        Hasher::new(&PasswordConfig {
            cost: 1,
            memory_kib: 256,
        })
    }

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hasher().hash(password).expect("hashing should succeed");
        assert_ne!(hash, password);
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher().verify(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = hasher().hash("pw1").unwrap();
        let b = hasher().hash("pw1").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hash = hasher().hash("correct-horse-battery-staple").unwrap();
        assert!(!hasher().verify("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = hasher().verify("anything", "not-a-valid-hash").unwrap_err();
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn hash_fails_on_empty_input() {
        assert!(hasher().hash("").is_err());
    }

    #[tokio::test]
    async fn spawned_hash_and_verify_roundtrip() {
        let hash = hasher().spawn_hash("pw1".into()).await.expect("hash");
        assert!(hasher().spawn_verify("pw1".into(), hash.clone()).await.expect("verify"));
        assert!(!hasher().spawn_verify("pw2".into(), hash).await.expect("verify"));
        assert!(hasher().spawn_hash(String::new()).await.is_err());
    }

    #[test]
    fn hash_fails_on_invalid_cost() {
        let bad = Hasher::new(&PasswordConfig {
            cost: 0,
            memory_kib: 256,
        });
        assert!(bad.hash("pw1").is_err());
    }
}
