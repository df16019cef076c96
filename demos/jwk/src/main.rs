//! Generate a `did:jwk` for a fresh Ed25519 key, or resolve the DID given as
//! the first argument, and print the generated document and the DID
//! resolution result.

use anyhow::{anyhow, Result};
use base64ct::{Base64UrlUnpadded, Encoding};
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use serde_json::{json, Value};
use vercre_didjwk::{driver, Jwk, MethodType, VerificationMethod};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    let mut resolver = driver();
    resolver.use_handler("EdDSA", key_pair)?;

    let did = if let Some(did) = std::env::args().nth(1) {
        did
    } else {
        let signing_key = SigningKey::generate(&mut OsRng);
        let x = Base64UrlUnpadded::encode_string(signing_key.verifying_key().as_bytes());
        let jwk = Jwk::try_from(json!({"kty": "OKP", "crv": "Ed25519", "alg": "EdDSA", "x": x}))?;

        let generated = resolver.from_jwk(&jwk, MethodType::JsonWebKey).await?;
        tracing::info!("generated {}", generated.did());
        println!("{}", serde_json::to_string_pretty(&generated.document)?);
        generated.did().to_string()
    };

    let resolution = resolver.resolve(&did).await;
    println!("{}", serde_json::to_string_pretty(&resolution)?);

    if !resolution.is_resolved() {
        return Err(anyhow!("could not resolve {did}"));
    }
    Ok(())
}

// Key pairs here are plain JSON: the demo only needs the public half.
async fn key_pair(method: VerificationMethod) -> Result<Value> {
    Ok(json!({
        "id": method.id,
        "type": method.type_,
        "controller": method.controller,
        "publicKeyJwk": method.public_key_jwk,
    }))
}
