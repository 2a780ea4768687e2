#![no_main]

//! Decodes arbitrary JSON into an order record and, when that succeeds,
//! checks that re-encoding round-trips (sets deduplicate on the way in).

use darkroom_core::model::Order;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(order) = serde_json::from_str::<Order>(text) {
        let json = serde_json::to_string(&order).expect("decoded order re-encodes");
        let round: Order = serde_json::from_str(&json).expect("encoded order decodes");
        assert_eq!(order, round);
    }
});
