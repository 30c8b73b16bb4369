pub const LINE_BREAK: u8 = b'\n';

pub const FIELD_DELIMITER: u8 = b',';

pub const QUOTE: u8 = b'"';

pub const DEFAULT_ARENA_CAPACITY: usize = 1 << 30;

pub const DEFAULT_ELEMENT_CAPACITY: usize = 2000;

pub const HASH_SEED: u64 = 0x100;

pub const HASH_MULTIPLIER: u64 = 1_111_111_111_111_111_111;

pub const DEFAULT_RESOURCE_ROOT: &str = "cards/content/card-images/arcs/en-US";

pub const DEFAULT_RESOURCE_EXTENSION: &str = "png";

/// Manifest column holding the fate tag or the item name.
pub(crate) const COL_TAG_OR_ITEM: usize = 1;
pub(crate) const COL_MECHANIC: usize = 2;
pub(crate) const COL_ID: usize = 3;
pub(crate) const COL_NOTE: usize = 4;

#[inline]
pub fn is_blank_byte(byte: u8) -> bool {
    byte <= b' '
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    fn test_is_blank_byte() {
        assert!(is_blank_byte(b' '));
        assert!(is_blank_byte(b'\t'));
        assert!(is_blank_byte(b'\r'));
        assert!(is_blank_byte(0));
        assert!(!is_blank_byte(b'!'));
        assert!(!is_blank_byte(0x80));
    }
}
