use hx711_core::sign_extend_24;
use proptest::prelude::*;

proptest! {
    /// Sign extension leaves values below 2^23 unchanged and maps the rest
    /// to `v - 2^24`.
    #[test]
    fn sign_extension_matches_twos_complement(v in 0u32..0x100_0000) {
        let expected = if v < 0x80_0000 {
            v as i64
        } else {
            v as i64 - (1 << 24)
        };
        prop_assert_eq!(i64::from(sign_extend_24(v)), expected);
    }

    /// The 25-bit signed range is never exceeded.
    #[test]
    fn sign_extension_stays_in_24_bit_range(v in 0u32..0x100_0000) {
        let s = sign_extend_24(v);
        prop_assert!((-8_388_608..=8_388_607).contains(&s));
    }
}
