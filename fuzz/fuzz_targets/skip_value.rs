#![no_main]

use libfuzzer_sys::fuzz_target;
use berdec::{Ber, Value};
use berdec::decode::Decoder;

fn skip_all(data: &[u8]) -> bool {
    let mut decoder = Decoder::<Ber, _>::new(data);
    loop {
        match decoder.next_object() {
            Ok(Some(obj)) => {
                if obj.skip().is_err() {
                    return false
                }
            }
            Ok(None) => break,
            Err(_) => return false,
        }
    }
    decoder.check_exhausted().is_ok()
}

fuzz_target!(|data: &[u8]| {
    // Skipping accepts the same framing that materializing accepts,
    // except for content rules and the deeper nesting the materializer
    // may reject first.
    let skipped = skip_all(data);
    let decoded = Value::decode::<Ber, _>(data).is_ok();
    if decoded {
        assert!(skipped);
    }
});
