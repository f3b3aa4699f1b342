//! End-to-end receive/send paths as the connection layer would drive them.

use crypto_box::aead::generic_array::GenericArray;
use crypto_box::aead::Aead;
use crypto_box::SalsaBox;
use salty_signaling::validate;
use salty_signaling::{
    check_identity, check_relay, Address, ClientContext, CloseCode, CodecConfig, Field, Message,
    MessageCodec, MessageType, Nonce, RawValue, SessionKeyPair, SignalingError,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn random_key_pair() -> SessionKeyPair {
    SessionKeyPair::from_secret_bytes(rand::random())
}

struct Peer {
    keys: SessionKeyPair,
    address: Address,
    cookie: [u8; 16],
}

impl Peer {
    fn new(address: Address) -> Self {
        Self {
            keys: random_key_pair(),
            address,
            cookie: rand::random(),
        }
    }

    /// The peer's own box towards the server session key.
    fn salsa_box(&self, server: &SessionKeyPair) -> SalsaBox {
        SalsaBox::new(server.public_key(), self.keys.secret_key())
    }
}

#[test]
fn client_auth_received_and_validated() {
    init_tracing();
    let codec = MessageCodec::default();
    let server = random_key_pair();
    let initiator = Peer::new(Address::INITIATOR);
    let ctx = ClientContext::authenticated(initiator.keys.public_key().clone(), server.clone());

    let server_cookie: [u8; 16] = rand::random();
    let msg = Message::client_auth(server_cookie, vec!["v1.saltyrtc.org".into()], 30, None);
    let nonce =
        Nonce::new(initiator.cookie, initiator.address, Address::SERVER, 1).expect("nonce");

    // Client side: encode + seal with its own box.
    let plaintext = codec.encode(&msg).expect("encode");
    let sealed = initiator
        .salsa_box(&server)
        .encrypt(GenericArray::from_slice(&nonce.to_bytes()), plaintext.as_slice())
        .expect("client seal");

    // Server side: nonce → identity → open → decode → validate.
    let nonce = Nonce::from_bytes(&nonce.to_bytes()).expect("nonce");
    check_identity(nonce.source, initiator.address).expect("identity");
    let received = Message::open(&codec, &ctx, &nonce.to_bytes(), &sealed).expect("open");

    assert_eq!(received.message_type, MessageType::ClientAuth);
    assert_eq!(received.your_cookie().expect("cookie"), server_cookie);
    assert_eq!(received.subprotocols().expect("subprotocols")[0], "v1.saltyrtc.org");
    assert_eq!(received.ping_interval().expect("ping"), 30);
    assert!(received.your_key().is_err());
}

#[test]
fn server_auth_sent_and_read_by_client() {
    init_tracing();
    let codec = MessageCodec::default();
    let server = random_key_pair();
    let responder = Peer::new(Address::new(0x02));
    let ctx = ClientContext::authenticated(responder.keys.public_key().clone(), server.clone());

    let msg = Message::server_auth_for_responder(responder.cookie, None, true);
    let nonce = Nonce::new(rand::random(), Address::SERVER, responder.address, 2)
        .expect("nonce")
        .to_bytes();
    let sealed = msg.seal(&codec, &ctx, &nonce).expect("seal");

    let opened = responder
        .salsa_box(&server)
        .decrypt(GenericArray::from_slice(&nonce), sealed.as_slice())
        .expect("client open");
    let decoded = codec.decode(&opened).expect("decode");
    assert_eq!(decoded, msg);
    assert!(decoded.initiator_connected().expect("initiator_connected"));
}

#[test]
fn server_hello_example() {
    let key = [0x5A; 32];
    let bytes = Message::server_hello(key).to_bytes().expect("encode");

    let mut rd = bytes.as_slice();
    assert_eq!(rmp::decode::read_map_len(&mut rd).expect("map"), 2);

    let decoded = Message::from_bytes(&bytes).expect("decode");
    assert_eq!(decoded.message_type, MessageType::ServerHello);
    assert_eq!(decoded.present_fields(), vec![Field::Key]);
    assert_eq!(decoded.key().expect("key").as_bytes(), &key);
}

#[test]
fn unauthenticated_context_is_refused() {
    let client = random_key_pair();
    let ctx = ClientContext::new().with_client_key(client.public_key().clone());
    let msg = Message::new_initiator();
    let result = msg.seal(&MessageCodec::default(), &ctx, &[0u8; 24]);
    assert!(matches!(result, Err(SignalingError::NotAuthenticated)));
}

#[test]
fn tampered_payload_is_dropped() {
    init_tracing();
    let codec = MessageCodec::default();
    let server = random_key_pair();
    let client = random_key_pair();
    let ctx = ClientContext::authenticated(client.public_key().clone(), server);
    let nonce = [3u8; 24];

    let mut sealed = Message::new_initiator()
        .seal(&codec, &ctx, &nonce)
        .expect("seal");
    let last = sealed.len() - 1;
    sealed[last] ^= 0x01;
    assert!(matches!(
        Message::open(&codec, &ctx, &nonce, &sealed),
        Err(SignalingError::CannotDecryptPayload)
    ));
}

#[test]
fn drop_responder_from_initiator() {
    let codec = MessageCodec::new(CodecConfig::new().max_message_size(1024));
    let msg = Message::drop_responder(Address::new(0x07), Some(CloseCode::DroppedByInitiator));
    let received = codec.decode(&codec.encode(&msg).unwrap()).unwrap();

    assert_eq!(received.responder_id().unwrap(), Address::new(0x07));
    assert_eq!(received.reason().unwrap(), CloseCode::DroppedByInitiator);

    // The initiator may not name itself or the server.
    for id in [Address::SERVER, Address::INITIATOR] {
        let bad = Message::drop_responder(id, None);
        let err = bad.responder_id().unwrap_err();
        assert_eq!(err.message_type, MessageType::DropResponder);
        assert_eq!(err.field, Field::Id);
        assert!(matches!(err.kind(), SignalingError::InvalidFieldValue { .. }));
    }
}

#[test]
fn relay_rules() {
    let responder = Address::new(0x09);
    assert!(check_relay(Address::INITIATOR, responder).is_ok());
    assert!(check_relay(responder, Address::INITIATOR).is_ok());
    assert!(matches!(
        check_relay(responder, Address::new(0x0a)),
        Err(SignalingError::NotAllowedMessage { .. })
    ));
    assert!(matches!(
        check_identity(Address::new(0x0a), responder),
        Err(SignalingError::IdentityMismatch { .. })
    ));
}

#[test]
fn address_boundaries() {
    let int = |v: i128| RawValue::Integer(v);
    for v in [0, 1] {
        assert!(validate::is_valid_address_id(Some(&int(v))));
        assert!(!validate::is_valid_responder_id(Some(&int(v))));
    }
    for v in [2, 255] {
        assert!(validate::is_valid_address_id(Some(&int(v))));
        assert!(validate::is_valid_responder_id(Some(&int(v))));
    }
    for v in [-1, 256] {
        assert!(!validate::is_valid_address_id(Some(&int(v))));
        assert!(!validate::is_valid_responder_id(Some(&int(v))));
    }
}

#[test]
fn reason_code_boundaries() {
    let int = |v: i128| RawValue::Integer(v);
    for code in [1001, 1002, 3000, 3007] {
        assert!(validate::is_valid_reason_code(Some(&int(code))));
    }
    assert!(!validate::is_valid_reason_code(Some(&int(2000))));
    assert!(!validate::is_valid_reason_code(None));
}

#[test]
fn send_error_carries_nonce_id() {
    let failed = Nonce::new([1; 16], Address::INITIATOR, Address::new(0x04), 77).unwrap();
    let msg = Message::send_error(failed.message_id());
    let decoded = Message::from_bytes(&msg.to_bytes().unwrap()).unwrap();
    let id = decoded.message_id().unwrap();
    assert_eq!(id[0], 0x01);
    assert_eq!(id[1], 0x04);
    assert_eq!(&id[4..], &77u32.to_be_bytes());
}
