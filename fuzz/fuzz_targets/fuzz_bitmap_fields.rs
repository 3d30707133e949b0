#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sxi::BitMap;

#[derive(Arbitrary, Debug)]
struct Field {
    pos: u16,
    bits: u8,
    value: u64,
}

fuzz_target!(|fields: Vec<Field>| {
    // Writes are checked against a per-bit model of the bitmap
    let len = 4096u64;
    let mut map = BitMap::new(len);
    let mut model = vec![false; len as usize];

    for field in fields.iter().take(64) {
        let pos = field.pos as u64;
        let bits = field.bits as u32;
        let Ok(()) = map.set_val_pos(pos, field.value, bits) else {
            continue;
        };
        for i in 0..bits as u64 {
            model[(pos + i) as usize] = (field.value >> (bits as u64 - 1 - i)) & 1 == 1;
        }
        assert_eq!(map.get_val_pos(pos, bits).unwrap(), field.value);
    }

    for (i, &bit) in model.iter().enumerate() {
        assert_eq!(map.get_bit(i as u64).unwrap(), bit);
    }
});
