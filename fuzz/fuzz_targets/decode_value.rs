#![no_main]

use libfuzzer_sys::fuzz_target;
use berdec::{Ber, Der, Value};

fuzz_target!(|data: &[u8]| {
    let ber = Value::decode::<Ber, _>(data);
    let der = Value::decode::<Der, _>(data);

    // DER is a subset of BER: whatever decodes under DER must decode
    // under BER to the same value.
    if let Ok(der) = der {
        assert_eq!(ber.unwrap(), der);
    }
});
