//! Size class math
//!
//! Class `i` holds slots of `BASE_BLOCK << i` bytes.

/// Slot length of size class 0
pub const BASE_BLOCK: u64 = 256;

/// Smallest size class whose slot holds `len` bytes
pub fn size_class_for(len: usize) -> u8 {
    let len = len as u64;
    let mut class = 0u8;
    while (BASE_BLOCK << class) < len {
        class += 1;
    }
    class
}

/// Slot length in bytes for a size class
pub fn slot_size(class: u8) -> u64 {
    BASE_BLOCK << class
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_class_for_small_lengths() {
        assert_eq!(size_class_for(0), 0);
        assert_eq!(size_class_for(1), 0);
        assert_eq!(size_class_for(256), 0);
    }

    #[test]
    fn test_size_class_for_boundaries() {
        assert_eq!(size_class_for(257), 1);
        assert_eq!(size_class_for(512), 1);
        assert_eq!(size_class_for(513), 2);
        assert_eq!(size_class_for(1024), 2);
        assert_eq!(size_class_for(1025), 3);
    }

    #[test]
    fn test_slot_size_doubles() {
        assert_eq!(slot_size(0), 256);
        for class in 1..10u8 {
            assert_eq!(slot_size(class), slot_size(class - 1) * 2);
        }
    }

    #[test]
    fn test_class_is_smallest_fit() {
        for len in [1usize, 100, 255, 256, 300, 700, 4000, 70_000] {
            let class = size_class_for(len);
            assert!(slot_size(class) >= len as u64);
            if class > 0 {
                assert!(slot_size(class - 1) < len as u64, "len {}", len);
            }
        }
    }
}
