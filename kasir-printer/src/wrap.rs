//! Fixed-width line chunking for thermal paper
//!
//! Thermal printers hard-wrap at the column limit, so long fields are split
//! here first. The split is greedy and not word-aware: a string longer than
//! the width becomes consecutive `width`-character segments, the last one
//! possibly shorter. Characters are counted as Unicode scalar values.

/// Split `s` into segments of at most `width` characters.
///
/// A string that already fits (including the empty string) comes back as a
/// single segment. Concatenating the segments always yields `s`.
/// A `width` of zero disables splitting.
pub fn chunk(s: &str, width: usize) -> Vec<&str> {
    if width == 0 || s.chars().count() <= width {
        return vec![s];
    }

    let mut segments = Vec::with_capacity(s.len() / width + 1);
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in s.char_indices() {
        if count == width {
            segments.push(&s[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    segments.push(&s[start..]);
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_string_is_single_segment() {
        assert_eq!(chunk("Nasi Putih", 32), vec!["Nasi Putih"]);
        assert_eq!(chunk("", 32), vec![""]);
    }

    #[test]
    fn test_exact_width_not_split() {
        let s = "a".repeat(32);
        assert_eq!(chunk(&s, 32), vec![s.as_str()]);
    }

    #[test]
    fn test_splits_mid_word() {
        assert_eq!(
            chunk("Restoran Contoh Makanan Lezat Sekali", 32),
            vec!["Restoran Contoh Makanan Lezat Se", "kali"]
        );
    }

    #[test]
    fn test_segments_bounded_and_lossless() {
        let inputs = [
            "Jl. Raya Pasar Minggu No. 45, Kel. Pejaten Timur, Jakarta Selatan 12510",
            "x",
            "Sate Ayam Madura dengan Lontong dan Bumbu Kacang Extra Pedas",
            "Es teh manis 🧊 tanpa gula, tolong dipisah ya kak 🙏",
        ];
        for width in [1, 5, 20, 32, 48] {
            for input in inputs {
                let segments = chunk(input, width);
                assert!(segments.iter().all(|s| s.chars().count() <= width));
                assert_eq!(segments.concat(), input);
            }
        }
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        let segments = chunk("ééééé", 2);
        assert_eq!(segments, vec!["éé", "éé", "é"]);
    }

    #[test]
    fn test_zero_width_disables_split() {
        assert_eq!(chunk("abc", 0), vec!["abc"]);
    }
}
