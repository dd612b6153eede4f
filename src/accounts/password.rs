use argon2::{
    password_hash::{PasswordHash, PasswordHasher, Salt, SaltString},
    Argon2, Params,
};
use rand::rngs::OsRng;
use subtle::ConstantTimeEq;
use tracing::error;

/// Fixed salt for dummy work ("shiftboard-dummy" in unpadded B64).
const DUMMY_SALT: &str = "c2hpZnRib2FyZC1kdW1teQ";

/// Hash `plain` with a fresh random salt. The result is a PHC string carrying salt and params.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// Recompute the hash of `plain` with the salt and parameters stored in `hash` and compare
/// digests in constant time.
pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    let salt = parsed
        .salt
        .ok_or_else(|| anyhow::anyhow!("stored hash has no salt"))?;
    let expected = parsed
        .hash
        .ok_or_else(|| anyhow::anyhow!("stored hash has no digest"))?;
    let params = Params::try_from(&parsed).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let recomputed = Argon2::default()
        .hash_password_customized(
            plain.as_bytes(),
            Some(parsed.algorithm),
            parsed.version,
            params,
            salt,
        )
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let actual = recomputed
        .hash
        .ok_or_else(|| anyhow::anyhow!("argon2 produced no digest"))?;

    Ok(actual.as_bytes().ct_eq(expected.as_bytes()).into())
}

/// Burn one Argon2 run with default params, for paths that have no usable stored hash, so a
/// miss costs the same as a real verification.
pub fn verify_dummy(plain: &str) {
    match Salt::from_b64(DUMMY_SALT) {
        Ok(salt) => {
            let _ = Argon2::default().hash_password(plain.as_bytes(), salt);
        }
        Err(e) => error!(error = %e, "dummy salt rejected"),
    }
}
