use anyhow::{Error, Result, anyhow};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

type HmacSha256 = Hmac<Sha256>;

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json())
        .init();
}

/// Signs a request as `hex(HMAC-SHA256(secret, method + hex(sha256(body)) + content_type))`.
pub fn compute_hmac256(
    method: &str,
    body: &[u8],
    content_type: &str,
    secret: &str,
) -> Result<String, Error> {
    let body_hash = hex::encode(Sha256::digest(body));
    let message = format!("{}{}{}", method, body_hash, content_type);

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| anyhow!("Invalid HMAC key"))?;
    mac.update(message.as_bytes());

    Ok(hex::encode(mac.finalize().into_bytes()))
}
