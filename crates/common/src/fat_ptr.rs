//! Fat pointers pack one or two (offset, length) pairs into a single integer so they can cross
//! the host/guest boundary as a scalar return value.
//!
//! wasm function signatures historically only support scalar results, so a host function that
//! hands the guest some bytes can't return a slice or a tuple. Instead it returns a u64 with the
//! length in the high 32 bits and the guest offset in the low 32 bits.
//!
//! The offset always represents a position in the guest's linear memory, _never_ on the host.
//! The length always represents u8 bytes, _not_ items.
use crate::GuestPtr;
use crate::Len;
use serde::Deserialize;
use serde::Serialize;

/// (len << 32) | ptr
pub type FatPtr64 = u64;

/// (len2 << 96) | (ptr2 << 64) | (len1 << 32) | ptr1
pub type FatPtr128 = u128;

pub const FAT_PTR_128_BYTES_LEN: usize = std::mem::size_of::<FatPtr128>();
/// little endian bytes of a FatPtr128, for targets without a native 128 bit integer
pub type FatPtr128Bytes = [u8; FAT_PTR_128_BYTES_LEN];

const LOW_32: u64 = 0xFFFF_FFFF;
const LOW_32_WIDE: u128 = 0xFFFF_FFFF;

/// Split a FatPtr64 into its guest offset and length.
///
/// Every u64 is a valid input. The decoded region may point anywhere, validating it against
/// the guest's memory is the job of whoever dereferences it.
#[cfg_attr(feature = "fuzzing", test_fuzz::test_fuzz)]
#[inline]
pub fn decode64(combined: FatPtr64) -> (GuestPtr, Len) {
    let len = (combined >> 32) as Len;
    let ptr = (combined & LOW_32) as GuestPtr;
    (ptr, len)
}

/// Inverse of `decode64`.
#[cfg_attr(feature = "fuzzing", test_fuzz::test_fuzz)]
#[inline]
pub fn encode64(ptr: GuestPtr, len: Len) -> FatPtr64 {
    (u64::from(len) << 32) | u64::from(ptr)
}

/// wasm only has signed integers so a FatPtr64 is an i64 on the wire.
/// The bit pattern is preserved, a negative i64 simply has a length >= 2^31.
#[inline]
pub fn decode_i64(combined: i64) -> (GuestPtr, Len) {
    decode64(combined as FatPtr64)
}

#[inline]
pub fn encode_i64(ptr: GuestPtr, len: Len) -> i64 {
    encode64(ptr, len) as i64
}

/// Two independent offset/length pairs decoded from a FatPtr128.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FatPtr128Fields {
    pub ptr1: GuestPtr,
    pub len1: Len,
    pub ptr2: GuestPtr,
    pub len2: Len,
}

impl FatPtr128Fields {
    pub fn new(ptr1: GuestPtr, len1: Len, ptr2: GuestPtr, len2: Len) -> Self {
        Self {
            ptr1,
            len1,
            ptr2,
            len2,
        }
    }

    pub fn first(&self) -> (GuestPtr, Len) {
        (self.ptr1, self.len1)
    }

    pub fn second(&self) -> (GuestPtr, Len) {
        (self.ptr2, self.len2)
    }
}

impl From<FatPtr128> for FatPtr128Fields {
    fn from(encoded: FatPtr128) -> Self {
        decode128(encoded)
    }
}

impl From<FatPtr128Fields> for FatPtr128 {
    fn from(fields: FatPtr128Fields) -> Self {
        encode128(fields.ptr1, fields.len1, fields.ptr2, fields.len2)
    }
}

/// Split a FatPtr128 into its four 32 bit fields.
/// Field order from the least significant bits: ptr1, len1, ptr2, len2.
#[inline]
pub fn decode128(encoded: FatPtr128) -> FatPtr128Fields {
    FatPtr128Fields {
        ptr1: (encoded & LOW_32_WIDE) as GuestPtr,
        len1: ((encoded >> 32) & LOW_32_WIDE) as Len,
        ptr2: ((encoded >> 64) & LOW_32_WIDE) as GuestPtr,
        len2: ((encoded >> 96) & LOW_32_WIDE) as Len,
    }
}

/// Inverse of `decode128`.
#[inline]
pub fn encode128(ptr1: GuestPtr, len1: Len, ptr2: GuestPtr, len2: Len) -> FatPtr128 {
    (u128::from(len2) << 96)
        | (u128::from(ptr2) << 64)
        | (u128::from(len1) << 32)
        | u128::from(ptr1)
}

/// Split a FatPtr128 into (low, high) u64 halves.
/// The low half is exactly the FatPtr64 of the first pair and the high half the second.
#[inline]
pub fn split_u128(encoded: FatPtr128) -> (FatPtr64, FatPtr64) {
    (encoded as FatPtr64, (encoded >> 64) as FatPtr64)
}

#[inline]
pub fn merge_u128(lo: FatPtr64, hi: FatPtr64) -> FatPtr128 {
    (u128::from(hi) << 64) | u128::from(lo)
}

#[inline]
pub fn fat_ptr_128_to_bytes(encoded: FatPtr128) -> FatPtr128Bytes {
    encoded.to_le_bytes()
}

#[inline]
pub fn fat_ptr_128_from_bytes(bytes: FatPtr128Bytes) -> FatPtr128 {
    FatPtr128::from_le_bytes(bytes)
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn decode64_scenario() {
        assert_eq!((0x0000_000A, 0x0000_0005), decode64(0x0000_0005_0000_000A));
    }

    #[test]
    fn decode64_boundaries() {
        assert_eq!((0, 0), decode64(0));
        assert_eq!((u32::MAX, u32::MAX), decode64(u64::MAX));
        assert_eq!((u32::MAX, 0), decode64(0x0000_0000_FFFF_FFFF));
        assert_eq!((0, u32::MAX), decode64(0xFFFF_FFFF_0000_0000));
    }

    #[test]
    fn round_trip_64() {
        for (ptr, len) in [
            (0, 0),
            (1, 0),
            (0, 1),
            (65_536, 32),
            (0x8000_0000, 0x8000_0000),
            (u32::MAX, u32::MAX),
            (0xDEAD_BEEF, 0x0BAD_F00D),
        ] {
            assert_eq!((ptr, len), decode64(encode64(ptr, len)));
        }
    }

    #[test]
    fn length_does_not_leak_into_pointer() {
        let ptr = 0x1234_5678;
        for len in [0, 1, 0xFF, 0xFFFF_FFFF, 0x8000_0001] {
            assert_eq!(ptr, decode64(encode64(ptr, len)).0);
        }
        let len = 0x0000_0040;
        for ptr in [0, 1, 0xFF, 0xFFFF_FFFF, 0x8000_0001] {
            assert_eq!(len, decode64(encode64(ptr, len)).1);
        }
    }

    #[test]
    fn i64_abi_keeps_the_bit_pattern() {
        // a length with the top bit set makes the wire value negative
        let combined = encode_i64(7, 0x8000_0000);
        assert!(combined < 0);
        assert_eq!((7, 0x8000_0000), decode_i64(combined));
        assert_eq!((u32::MAX, u32::MAX), decode_i64(-1));
        assert_eq!(encode64(3, 4) as i64, encode_i64(3, 4));
    }

    #[test]
    fn decode128_boundaries() {
        assert_eq!(FatPtr128Fields::default(), decode128(0));

        let only_ptr2: FatPtr128 = 0xCAFE_BABE << 64;
        assert_eq!(FatPtr128Fields::new(0, 0, 0xCAFE_BABE, 0), decode128(only_ptr2));

        assert_eq!(
            FatPtr128Fields::new(u32::MAX, u32::MAX, u32::MAX, u32::MAX),
            decode128(u128::MAX)
        );
    }

    #[test]
    fn decode128_field_order() {
        let encoded: FatPtr128 = 0x0000_0004_0000_0003_0000_0002_0000_0001;
        let fields = decode128(encoded);
        assert_eq!((1, 2), fields.first());
        assert_eq!((3, 4), fields.second());
    }

    #[test]
    fn round_trip_128() {
        for (ptr1, len1, ptr2, len2) in [
            (0, 0, 0, 0),
            (1, 2, 3, 4),
            (u32::MAX, 0, u32::MAX, 0),
            (0, u32::MAX, 0, u32::MAX),
            (0xDEAD_BEEF, 0x0BAD_F00D, 0xFEED_FACE, 0x8BAD_F00D),
        ] {
            let fields = decode128(encode128(ptr1, len1, ptr2, len2));
            assert_eq!(FatPtr128Fields::new(ptr1, len1, ptr2, len2), fields);
            assert_eq!(
                encode128(ptr1, len1, ptr2, len2),
                FatPtr128::from(fields)
            );
        }
    }

    #[test]
    fn halves_are_64_bit_fat_pointers() {
        let encoded = encode128(10, 20, 30, 40);
        let (lo, hi) = split_u128(encoded);
        assert_eq!(encode64(10, 20), lo);
        assert_eq!(encode64(30, 40), hi);
        assert_eq!(encoded, merge_u128(lo, hi));
    }

    #[test]
    fn fat_ptr_128_bytes_are_little_endian() {
        let encoded = encode128(1, 2, 3, 4);
        let bytes = fat_ptr_128_to_bytes(encoded);
        assert_eq!([1, 0, 0, 0], bytes[0..4]);
        assert_eq!([2, 0, 0, 0], bytes[4..8]);
        assert_eq!([3, 0, 0, 0], bytes[8..12]);
        assert_eq!([4, 0, 0, 0], bytes[12..16]);
        assert_eq!(encoded, fat_ptr_128_from_bytes(bytes));
    }
}
