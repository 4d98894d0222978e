#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(pool) = blockfill_pool::parse_text(input) else {
        return;
    };

    // Whatever parses must survive a write/parse round trip.
    let mut out = Vec::new();
    if blockfill_pool::write_text(&pool, &mut out).is_ok() {
        let text = String::from_utf8(out).expect("writer emits UTF-8");
        let again = blockfill_pool::parse_text(&text).expect("written pool parses");
        assert_eq!(again, pool);
    }
});
