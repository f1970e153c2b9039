use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::Hmac;
use pbkdf2::pbkdf2;
use rand::Rng;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

// PBKDF2-HMAC-SHA256: assez lent pour décourager le brute force hors ligne
const ITERATIONS: u32 = 260000;
const KEY_LENGTH: usize = 32;
const SALT_LENGTH: usize = 16;

fn derive_key(password: &str, salt: &[u8], iterations: u32, out: &mut [u8]) -> Result<(), String> {
    pbkdf2::<HmacSha256>(password.as_bytes(), salt, iterations, out)
        .map_err(|e| format!("PBKDF2 derivation failed: {}", e))
}

/// Hash un mot de passe avec un salt aléatoire de 16 bytes.
/// Sortie: `pbkdf2:sha256:260000$<salt>$<hash>` (base64url sans padding).
pub fn hash_password(password: &str) -> Result<String, String> {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill(&mut salt);

    let mut key = [0u8; KEY_LENGTH];
    derive_key(password, &salt, ITERATIONS, &mut key)?;

    Ok(format!(
        "pbkdf2:sha256:{}${}${}",
        ITERATIONS,
        URL_SAFE_NO_PAD.encode(salt),
        URL_SAFE_NO_PAD.encode(key)
    ))
}

/// Vérifie un mot de passe contre un hash stocké.
/// Err = hash illisible (corruption); Ok(false) = mauvais mot de passe.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, String> {
    let (iterations, salt, expected) = parse_stored_hash(stored_hash)?;

    let mut computed = vec![0u8; expected.len()];
    derive_key(password, &salt, iterations, &mut computed)?;

    // Comparaison en temps constant
    Ok(constant_time_eq(&computed, &expected))
}

/// Découpe `pbkdf2:sha256:<iterations>$<salt>$<hash>` en ses trois morceaux.
/// Seul notre propre format est accepté: aucun hash hérité n'existe ici.
fn parse_stored_hash(stored_hash: &str) -> Result<(u32, Vec<u8>, Vec<u8>), String> {
    let mut parts = stored_hash.split('$');
    let (header, salt_b64, hash_b64) = match (parts.next(), parts.next(), parts.next(), parts.next())
    {
        (Some(header), Some(salt), Some(hash), None) => (header, salt, hash),
        _ => return Err("Invalid hash format".to_string()),
    };

    let iterations = match header.split(':').collect::<Vec<_>>().as_slice() {
        ["pbkdf2", "sha256", iterations] => iterations
            .parse::<u32>()
            .map_err(|_| "Invalid iteration count".to_string())?,
        _ => return Err("Invalid hash header".to_string()),
    };

    let salt = URL_SAFE_NO_PAD
        .decode(salt_b64)
        .map_err(|e| format!("Salt decode failed: {}", e))?;
    let expected = URL_SAFE_NO_PAD
        .decode(hash_b64)
        .map_err(|e| format!("Hash decode failed: {}", e))?;

    if salt.is_empty() || expected.is_empty() {
        return Err("Invalid hash format".to_string());
    }

    Ok((iterations, salt, expected))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
