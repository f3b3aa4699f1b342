use proptest::prelude::*;
use salty_signaling::crypto;
use salty_signaling::{ClientContext, SessionKeyPair, SignalingError, NONCE_LENGTH, TAG_LENGTH};

/// Server-side context: client public key + server session key pair.
fn context(client_seed: u8, server_seed: u8) -> ClientContext {
    let client = SessionKeyPair::from_secret_bytes([client_seed; 32]);
    let server = SessionKeyPair::from_secret_bytes([server_seed; 32]);
    ClientContext::authenticated(client.public_key().clone(), server)
}

proptest! {
    /// Any plaintext survives seal→open under any nonce.
    #[test]
    fn roundtrip_any_payload(
        payload in prop::collection::vec(any::<u8>(), 0..20000),
        nonce in any::<[u8; NONCE_LENGTH]>(),
    ) {
        let ctx = context(1, 2);
        let sealed = crypto::seal(&ctx, &nonce, &payload).expect("seal");
        let opened = crypto::open(&ctx, &nonce, &sealed).expect("open");
        prop_assert_eq!(&opened, &payload);
    }

    /// Sealed size is always plaintext + tag.
    #[test]
    fn ciphertext_size_invariant(
        payload in prop::collection::vec(any::<u8>(), 0..5000),
    ) {
        let ctx = context(3, 4);
        let sealed = crypto::seal(&ctx, &[0u8; NONCE_LENGTH], &payload).expect("seal");
        prop_assert_eq!(sealed.len(), payload.len() + TAG_LENGTH);
    }

    /// Flipping any single bit is detected and yields no plaintext.
    #[test]
    fn single_bit_flip_detected(
        payload in prop::collection::vec(any::<u8>(), 0..512),
        nonce in any::<[u8; NONCE_LENGTH]>(),
        bit in any::<prop::sample::Index>(),
    ) {
        let ctx = context(5, 6);
        let mut sealed = crypto::seal(&ctx, &nonce, &payload).expect("seal");
        let i = bit.index(sealed.len() * 8);
        sealed[i / 8] ^= 1 << (i % 8);

        let result = crypto::open(&ctx, &nonce, &sealed);
        prop_assert!(matches!(result, Err(SignalingError::CannotDecryptPayload)));
    }

    /// A context for a different client never opens the payload.
    #[test]
    fn wrong_client_always_fails(
        payload in prop::collection::vec(any::<u8>(), 1..1000),
        sender_seed in 10..50u8,
        wrong_seed in 50..90u8,
    ) {
        let ctx = context(sender_seed, 2);
        let wrong = context(wrong_seed, 2);
        let sealed = crypto::seal(&ctx, &[7u8; NONCE_LENGTH], &payload).expect("seal");
        prop_assert!(crypto::open(&wrong, &[7u8; NONCE_LENGTH], &sealed).is_err());
    }

    /// Nonces shorter than 24 bytes are refused without reading past them.
    #[test]
    fn short_nonce_refused(len in 0..NONCE_LENGTH) {
        let ctx = context(1, 2);
        let nonce = vec![0u8; len];
        let is_too_short = matches!(
            crypto::seal(&ctx, &nonce, b"x"),
            Err(SignalingError::MessageTooShort { .. })
        );
        prop_assert!(is_too_short);
    }
}
