const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// Return the length of the UTF-8 BOM starting the given slice, if any.
#[inline]
pub fn trim_bom(slice: &[u8]) -> usize {
    if slice.starts_with(UTF8_BOM) {
        UTF8_BOM.len()
    } else {
        0
    }
}

/// Return the end of `slice[start..end]` once a single trailing CR has been
/// dropped. The CR must lie within the range to be dropped.
#[inline(always)]
pub fn end_without_cr(slice: &[u8], start: usize, end: usize) -> usize {
    if end > start && slice[end - 1] == b'\r' {
        end - 1
    } else {
        end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_bom() {
        assert_eq!(trim_bom(b""), 0);
        assert_eq!(trim_bom(b"name"), 0);
        assert_eq!(trim_bom(b"\xef\xbb"), 0);
        assert_eq!(trim_bom(b"\xef\xbb\xbfname"), 3);
    }

    #[test]
    fn test_end_without_cr() {
        assert_eq!(end_without_cr(b"john\r", 0, 5), 4);
        assert_eq!(end_without_cr(b"john", 0, 4), 4);
        assert_eq!(end_without_cr(b"\r", 1, 1), 1);
        assert_eq!(end_without_cr(b"", 0, 0), 0);
    }
}
