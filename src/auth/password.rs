use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};

use super::AuthError;

/// Argon2id work factors applied to newly hashed passwords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordCost {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordCost {
    fn default() -> Self {
        // OWASP recommendation for Argon2id
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl PasswordCost {
    /// Cheapest cost the algorithm accepts. Only for tests and local seeding.
    pub fn minimal() -> Self {
        Self {
            memory_kib: Params::MIN_M_COST,
            iterations: 1,
            parallelism: 1,
        }
    }

    fn hasher(&self) -> Result<Argon2<'static>, AuthError> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| AuthError::PasswordHash(e.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Hashes into a PHC string (`$argon2id$v=19$m=...`) with a fresh random salt.
pub fn hash_password(password: &str, cost: &PasswordCost) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = cost
        .hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::PasswordHash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Work factors are read back from the stored hash, so older costs keep verifying.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_are_salted_and_verifiable() {
        let cost = PasswordCost::minimal();
        let a = hash_password("hunter2", &cost).unwrap();
        let b = hash_password("hunter2", &cost).unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("$argon2id$v=19$"));
        assert!(verify_password("hunter2", &a));
        assert!(!verify_password("hunter3", &a));
    }

    #[test]
    fn cost_is_recorded_in_the_hash() {
        let cost = PasswordCost { memory_kib: 64, iterations: 3, parallelism: 1 };
        let hash = hash_password("hunter2", &cost).unwrap();
        assert!(hash.contains("m=64,t=3,p=1"), "{}", hash);
        assert!(verify_password("hunter2", &hash));
    }

    #[test]
    fn plain_digests_never_verify() {
        assert!(!verify_password("x", "sha256$salt$2d711642b726b044"));
        assert!(!verify_password("x", "plaintext"));
        assert!(!verify_password("x", ""));
    }

    #[test]
    fn invalid_cost_is_an_error() {
        let cost = PasswordCost { memory_kib: 1, iterations: 0, parallelism: 1 };
        assert!(matches!(hash_password("x", &cost), Err(AuthError::PasswordHash(_))));
    }
}
