//! International Morse code dictionary (spec §4.A).
//!
//! Character ↔ representation lookup in both directions. `repr_to_char`
//! is backed by a 256-entry direct lookup table keyed by an 8-bit hash of
//! the representation (one sentinel bit plus up to 7 data bits — `libcw`'s
//! `cw_representation_to_hash_internal()` produces exactly this `uint8_t`
//! range, `[2, 255]`; see DESIGN.md for why this crate keeps 256 slots
//! rather than the spec prose's rounder "128").

use std::sync::OnceLock;

/// Representations are at most this many dots/dashes long.
pub const MAX_REPR_LENGTH: usize = 7;

/// Smallest hash value a valid (non-empty) representation can produce.
pub const MIN_REPR_HASH: u8 = 0b10;
/// Largest hash value a valid representation (length `MAX_REPR_LENGTH`) can produce.
pub const MAX_REPR_HASH: u8 = u8::MAX;

const DOT: char = '.';
const DASH: char = '-';

/// The full character ↔ representation table.
///
/// American Morse procedural signs `AR` and `BT` are folded into the
/// punctuation slots `+` and `=` respectively, following the convention
/// amateur-radio software (including this crate's teacher project) and
/// `libcw`'s own `CW_TABLE` use rather than inventing placeholder characters.
const CW_TABLE: &[(char, &str)] = &[
    ('A', ".-"), ('B', "-..."), ('C', "-.-."), ('D', "-.."),
    ('E', "."), ('F', "..-."), ('G', "--."), ('H', "...."),
    ('I', ".."), ('J', ".---"), ('K', "-.-"), ('L', ".-.."),
    ('M', "--"), ('N', "-."), ('O', "---"), ('P', ".--."),
    ('Q', "--.-"), ('R', ".-."), ('S', "..."), ('T', "-"),
    ('U', "..-"), ('V', "...-"), ('W', ".--"), ('X', "-..-"),
    ('Y', "-.--"), ('Z', "--.."),
    ('0', "-----"), ('1', ".----"), ('2', "..---"), ('3', "...--"),
    ('4', "....-"), ('5', "....."), ('6', "-...."), ('7', "--..."),
    ('8', "---.."), ('9', "----."),
    ('.', ".-.-.-"), (',', "--..--"), ('?', "..--.."), ('\'', ".----."),
    ('!', "-.-.--"), ('/', "-..-."), ('(', "-.--."), (')', "-.--.-"),
    ('&', ".-..."), (':', "---..."), (';', "-.-.-."), ('=', "-...-"),
    ('+', ".-.-."), ('-', "-....-"), ('_', "..--.-"), ('"', ".-..-."),
    ('$', "...-..-"), ('@', ".--.-."),
];

fn representation_hash(repr: &str) -> Option<u8> {
    if repr.is_empty() || repr.chars().count() > MAX_REPR_LENGTH {
        return None;
    }
    let mut hash: u8 = 1;
    for ch in repr.chars() {
        hash = hash.checked_shl(1)?;
        match ch {
            DOT => {}
            DASH => hash |= 1,
            _ => return None,
        }
    }
    Some(hash)
}

fn direct_lookup_table() -> &'static [Option<char>; 256] {
    static TABLE: OnceLock<[Option<char>; 256]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = [None; 256];
        for &(c, repr) in CW_TABLE {
            let hash = representation_hash(repr).expect("CW_TABLE entries are always valid");
            table[hash as usize] = Some(c);
        }
        table
    })
}

/// Encode a character into its dot/dash representation.
///
/// Case-insensitive. Returns `None` for characters with no known representation.
pub fn char_to_repr(c: char) -> Option<String> {
    let upper = c.to_ascii_uppercase();
    CW_TABLE
        .iter()
        .find(|(ch, _)| *ch == upper)
        .map(|(_, repr)| repr.to_string())
}

/// Decode a representation into its character via the O(1) direct lookup table.
pub fn repr_to_char(repr: &str) -> Option<char> {
    let hash = representation_hash(repr)?;
    direct_lookup_table()[hash as usize]
}

/// Same lookup as [`repr_to_char`] but by linear scan; kept only to let
/// the direct table's speed advantage be measured (spec §8: direct lookup
/// must be at least 1.1x faster than this over N=1000 runs).
pub fn repr_to_char_linear(repr: &str) -> Option<char> {
    CW_TABLE.iter().find(|(_, r)| *r == repr).map(|(c, _)| *c)
}

/// `true` iff `repr` is 1..=MAX_REPR_LENGTH symbols from `{'.', '-'}` and
/// names a known character.
pub fn is_valid_repr(repr: &str) -> bool {
    repr_to_char(repr).is_some()
}

/// `true` iff `c` (case-insensitively) has a known representation.
pub fn is_valid_char(c: char) -> bool {
    char_to_repr(c).is_some()
}

/// All characters the table knows, in table order.
pub fn list_characters() -> Vec<char> {
    CW_TABLE.iter().map(|(c, _)| *c).collect()
}

/// Number of characters in the table.
pub fn count() -> usize {
    CW_TABLE.len()
}

/// Longest representation present in the table, in symbols.
pub fn max_repr_length() -> usize {
    CW_TABLE.iter().map(|(_, r)| r.len()).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn round_trips_every_character() {
        for c in list_characters() {
            let repr = char_to_repr(c).unwrap();
            assert_eq!(repr_to_char(&repr), Some(c));
        }
    }

    #[test]
    fn case_insensitive_encode() {
        assert_eq!(char_to_repr('a'), char_to_repr('A'));
    }

    #[test]
    fn unknown_inputs_reject() {
        assert_eq!(char_to_repr('#'), None);
        assert_eq!(repr_to_char("......."), None); // 7 dots: no such letter
        assert_eq!(repr_to_char(""), None);
        assert_eq!(repr_to_char("x-.-"), None);
    }

    #[test]
    fn direct_and_linear_lookup_agree() {
        for &(_, repr) in CW_TABLE {
            assert_eq!(repr_to_char(repr), repr_to_char_linear(repr));
        }
    }

    #[test]
    fn hash_is_unique_per_length_class_and_in_range() {
        use std::collections::HashMap;
        let mut seen: HashMap<(usize, u8), String> = HashMap::new();
        for len in 1..=MAX_REPR_LENGTH {
            for bits in 0u32..(1 << len) {
                let repr: String = (0..len)
                    .map(|i| if (bits >> i) & 1 == 1 { DASH } else { DOT })
                    .collect();
                let hash = representation_hash(&repr).unwrap();
                assert!(hash >= MIN_REPR_HASH && hash <= MAX_REPR_HASH);
                let key = (len, hash);
                if let Some(prev) = seen.get(&key) {
                    panic!("hash collision within length class: {prev:?} vs {repr:?}");
                }
                seen.insert(key, repr);
            }
        }
    }

    #[test]
    fn direct_lookup_is_faster_than_linear_scan() {
        const N: usize = 1000;
        let reprs: Vec<&str> = CW_TABLE.iter().map(|(_, r)| *r).collect();

        let start = Instant::now();
        for _ in 0..N {
            for r in &reprs {
                std::hint::black_box(repr_to_char_linear(r));
            }
        }
        let linear = start.elapsed();

        let start = Instant::now();
        for _ in 0..N {
            for r in &reprs {
                std::hint::black_box(repr_to_char(r));
            }
        }
        let direct = start.elapsed();

        let gain = linear.as_secs_f64() / direct.as_secs_f64().max(1e-12);
        assert!(gain >= 1.1, "direct lookup only {gain:.2}x faster than linear scan");
    }
}
