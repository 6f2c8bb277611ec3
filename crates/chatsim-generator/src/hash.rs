//! Content hashing for near-duplicate suppression.

const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

/// 32-bit FNV-1a over the UTF-16 code units of `text`.
pub fn content_hash(text: &str) -> u32 {
    text.encode_utf16().fold(FNV_OFFSET_BASIS, |h, unit| {
        (h ^ u32::from(unit)).wrapping_mul(FNV_PRIME)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_offset_basis() {
        assert_eq!(content_hash(""), FNV_OFFSET_BASIS);
    }

    #[test]
    fn test_known_value() {
        // FNV-1a 32 of "a"
        assert_eq!(content_hash("a"), 0xE40C_292C);
    }

    #[test]
    fn test_distinguishes_suffix() {
        assert_ne!(content_hash("Diamond hands."), content_hash("Diamond hands. 🚀"));
        assert_eq!(content_hash("Diamond hands."), content_hash("Diamond hands."));
    }
}
