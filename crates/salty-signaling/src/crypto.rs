/// Per-client authenticated encryption.
///
/// NaCl `crypto_box` (X25519 + XSalsa20-Poly1305) between the client's
/// public key and the server's session secret key for that client. The
/// nonce is supplied by the caller; uniqueness per direction is the
/// caller's job. Output is the 16-byte tag followed by the ciphertext.
use std::fmt;

use crypto_box::aead::generic_array::GenericArray;
use crypto_box::aead::{Aead, OsRng};
use crypto_box::{PublicKey, SalsaBox, SecretKey};

use crate::error::SignalingError;
use crate::types::{NONCE_LENGTH, TAG_LENGTH};

/// The server's session key pair for one client.
#[derive(Clone)]
pub struct SessionKeyPair {
    secret: SecretKey,
    public: PublicKey,
}

impl SessionKeyPair {
    /// Generate a fresh session key pair from the OS RNG.
    pub fn generate() -> Self {
        Self::from_secret(SecretKey::generate(&mut OsRng))
    }

    pub fn from_secret(secret: SecretKey) -> Self {
        let public = secret.public_key();
        Self { secret, public }
    }

    pub fn from_secret_bytes(bytes: [u8; 32]) -> Self {
        Self::from_secret(SecretKey::from(bytes))
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret
    }
}

impl fmt::Debug for SessionKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeyPair")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

/// Key material of one connection, as seen by the envelope.
///
/// Implemented by whatever owns the connection; the envelope only borrows
/// it for the duration of a single seal/open.
pub trait KeyContext {
    /// The client's public key, once known.
    fn client_key(&self) -> Option<&PublicKey>;
    /// The server's session key pair for this client, once negotiated.
    fn server_session_keys(&self) -> Option<&SessionKeyPair>;
}

/// Plain [`KeyContext`] holding both keys.
#[derive(Debug, Clone, Default)]
pub struct ClientContext {
    pub client_key: Option<PublicKey>,
    pub server_session: Option<SessionKeyPair>,
}

impl ClientContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn authenticated(client_key: PublicKey, server_session: SessionKeyPair) -> Self {
        Self {
            client_key: Some(client_key),
            server_session: Some(server_session),
        }
    }

    pub fn with_client_key(mut self, key: PublicKey) -> Self {
        self.client_key = Some(key);
        self
    }

    pub fn with_server_session(mut self, keys: SessionKeyPair) -> Self {
        self.server_session = Some(keys);
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.client_key.is_some() && self.server_session.is_some()
    }
}

impl KeyContext for ClientContext {
    fn client_key(&self) -> Option<&PublicKey> {
        self.client_key.as_ref()
    }

    fn server_session_keys(&self) -> Option<&SessionKeyPair> {
        self.server_session.as_ref()
    }
}

fn salsa_box<C: KeyContext + ?Sized>(ctx: &C) -> Result<SalsaBox, SignalingError> {
    match (ctx.client_key(), ctx.server_session_keys()) {
        (Some(client_key), Some(session)) => Ok(SalsaBox::new(client_key, &session.secret)),
        _ => Err(SignalingError::NotAuthenticated),
    }
}

/// Copy the first `NONCE_LENGTH` bytes of `nonce`.
fn nonce_array(nonce: &[u8]) -> Result<[u8; NONCE_LENGTH], SignalingError> {
    let mut out = [0u8; NONCE_LENGTH];
    let head = nonce
        .get(..NONCE_LENGTH)
        .ok_or(SignalingError::MessageTooShort {
            actual: nonce.len(),
            min: NONCE_LENGTH,
        })?;
    out.copy_from_slice(head);
    Ok(out)
}

/// Seal `plaintext` for the client.
///
/// Fails with `NotAuthenticated` before any crypto if either key is missing.
pub fn seal<C: KeyContext + ?Sized>(
    ctx: &C,
    nonce: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>, SignalingError> {
    let cipher = salsa_box(ctx)?;
    let nonce = nonce_array(nonce)?;
    cipher
        .encrypt(GenericArray::from_slice(&nonce), plaintext)
        .map_err(|_| SignalingError::CannotEncryptPayload)
}

/// Open a payload sealed by the client.
///
/// All-or-nothing: either the full authenticated plaintext or
/// `CannotDecryptPayload`, with no indication of why.
pub fn open<C: KeyContext + ?Sized>(
    ctx: &C,
    nonce: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, SignalingError> {
    let cipher = salsa_box(ctx)?;
    let nonce = nonce_array(nonce)?;
    if ciphertext.len() < TAG_LENGTH {
        return Err(SignalingError::MessageTooShort {
            actual: ciphertext.len(),
            min: TAG_LENGTH,
        });
    }
    cipher
        .decrypt(GenericArray::from_slice(&nonce), ciphertext)
        .map_err(|_| {
            tracing::debug!(
                "decrypt failed for {:#04x} -> {:#04x}",
                nonce[16],
                nonce[17]
            );
            SignalingError::CannotDecryptPayload
        })
}
