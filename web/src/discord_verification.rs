
use anyhow::{Context, Result, anyhow};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use lambda_http::{Body, Request};

pub const SIGNATURE_HEADER: &str = "X-Signature-Ed25519";
pub const TIMESTAMP_HEADER: &str = "X-Signature-Timestamp";

/// Everything needed to authenticate one interaction request.
///
/// Any part may be missing; a missing part fails verification.
pub struct SignatureContext<'a> {
    raw_body: Option<&'a [u8]>,
    signature_hex: Option<&'a str>,
    timestamp: Option<&'a str>,
    public_key_hex: Option<&'a str>,
}

impl<'a> SignatureContext<'a> {
    pub fn new(
        raw_body: Option<&'a [u8]>,
        signature_hex: Option<&'a str>,
        timestamp: Option<&'a str>,
        public_key_hex: Option<&'a str>,
    ) -> Self {
        Self {
            raw_body,
            signature_hex,
            timestamp,
            public_key_hex,
        }
    }

    pub fn from_request(request: &'a Request, public_key_hex: Option<&'a str>) -> Self {
        let headers = request.headers();
        let header = |name: &str| headers.get(name).and_then(|value| value.to_str().ok());
        Self::new(
            raw_body(request.body()),
            header(SIGNATURE_HEADER),
            header(TIMESTAMP_HEADER),
            public_key_hex,
        )
    }

    /// Never fails: malformed or missing input is simply `false`.
    pub fn verify(self) -> bool {
        match self.check() {
            Ok(()) => true,
            Err(error) => {
                tracing::info!("signature rejected {:?}", error);
                false
            }
        }
    }

    // https://discord.com/developers/docs/interactions/overview#setting-up-an-endpoint-validating-security-request-headers
    fn check(&self) -> Result<()> {
        let raw_body = self.raw_body.context("request body is empty")?;
        let signature_hex = self.signature_hex.context("X-Signature-Ed25519 is empty")?;
        let timestamp = self.timestamp.context("X-Signature-Timestamp is empty")?;
        let public_key_hex = self.public_key_hex.context("public key is not configured")?;

        let key_bytes: [u8; 32] = hex::decode(public_key_hex)?
            .try_into()
            .map_err(|bytes: Vec<u8>| anyhow!("public key must be 32 bytes, got {}", bytes.len()))?;
        let public_key = VerifyingKey::from_bytes(&key_bytes)?;
        let signature_bytes: [u8; 64] = hex::decode(signature_hex)?
            .try_into()
            .map_err(|bytes: Vec<u8>| anyhow!("signature must be 64 bytes, got {}", bytes.len()))?;
        let signature = Signature::from_bytes(&signature_bytes);

        let message = [timestamp.as_bytes(), raw_body].concat();
        public_key.verify(&message, &signature)?;
        Ok(())
    }
}

pub fn raw_body(body: &Body) -> Option<&[u8]> {
    match body {
        Body::Empty => None,
        Body::Text(text) => Some(text.as_bytes()),
        Body::Binary(bytes) => Some(bytes.as_slice()),
    }
}
