#![no_main]

use libfuzzer_sys::fuzz_target;
use rand::rngs::OsRng;
use std::sync::OnceLock;
use zahl::RsaKeyPair;

static KEYPAIR: OnceLock<RsaKeyPair> = OnceLock::new();

fuzz_target!(|data: &[u8]| {
    let key_pair =
        KEYPAIR.get_or_init(|| RsaKeyPair::generate_with_size(512, &mut OsRng).unwrap());

    let Ok(packed) = key_pair.public_key().encrypt_bytes(data) else {
        return;
    };
    let decrypted = key_pair
        .private_key()
        .decrypt_bytes(&packed)
        .expect("own ciphertext must decrypt");

    assert_eq!(data, decrypted.as_slice());
});
