#![no_main]

use libfuzzer_sys::fuzz_target;
use rand::rngs::OsRng;
use std::sync::OnceLock;
use zahl::RsaKeyPair;

static KEYPAIR: OnceLock<RsaKeyPair> = OnceLock::new();

// Arbitrary bytes fed to the packed-format decoder must either decode or
// error, never panic or over-allocate.
fuzz_target!(|data: &[u8]| {
    let key_pair =
        KEYPAIR.get_or_init(|| RsaKeyPair::generate_with_size(512, &mut OsRng).unwrap());

    let _ = key_pair.private_key().decrypt_bytes(data);
});
