//! Circular arithmetic over the bucket index array.

/// Overflow-safe addition that wraps around `len`.
#[inline]
pub(crate) fn wrap_add(index: usize, offset: usize, len: usize) -> usize {
    debug_assert!(
        index < len && offset <= len,
        "{index} + {offset} (mod {len})",
    );

    if offset >= len - index {
        offset - (len - index)
    } else {
        index + offset
    }
}

/// Subtraction that wraps around `len`.
#[inline]
pub(crate) fn wrap_sub(index: usize, offset: usize, len: usize) -> usize {
    debug_assert!(
        index < len && offset <= len,
        "{index} - {offset} (mod {len})",
    );

    if offset > index {
        len - (offset - index)
    } else {
        index - offset
    }
}

/// Number of slots touched walking from `begin` to `end`, both inclusive.
///
/// `begin == end` counts as a single slot; the walk never laps.
#[inline]
pub(crate) fn span(begin: usize, end: usize, len: usize) -> usize {
    if begin <= end {
        end - begin + 1
    } else {
        len - (begin - end) + 1
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_wrap_add() {
        assert_eq!(wrap_add(0, 1, 2), 1);
        assert_eq!(wrap_add(1, 1, 2), 0);
        assert_eq!(wrap_add(5, 3, 8), 0);
        assert_eq!(wrap_add(5, 7, 8), 4);
        assert_eq!(wrap_add(3, 8, 8), 3);
        assert_eq!(wrap_add(usize::MAX - 1, 1, usize::MAX), 0);
    }

    #[test]
    fn test_wrap_sub() {
        assert_eq!(wrap_sub(0, 1, 2), 1);
        assert_eq!(wrap_sub(1, 1, 2), 0);
        assert_eq!(wrap_sub(2, 5, 8), 5);
        assert_eq!(wrap_sub(3, 8, 8), 3);
    }

    #[test]
    fn test_span() {
        assert_eq!(span(0, 0, 4), 1);
        assert_eq!(span(0, 1, 2), 2);
        assert_eq!(span(1, 0, 2), 2);
        assert_eq!(span(3, 1, 4), 3);
        assert_eq!(span(2, 1, 4), 4);
        for len in 1..10 {
            for begin in 0..len {
                for offset in 0..len {
                    let end = wrap_add(begin, offset, len);
                    assert_eq!(span(begin, end, len), offset + 1);
                    assert_eq!(wrap_sub(end, offset, len), begin);
                }
            }
        }
    }
}
