//! Pattern escaping, random selection and capitalization helpers.

use rand::Rng;
use rand::seq::SliceRandom;

/// Escapes every regex metacharacter in `s`.
pub fn escape_for_pattern(s: &str) -> String {
    regex::escape(s)
}

/// Returns a uniformly random element of `list`, or `None` if it is empty.
pub fn random_choice<'a, T, R: Rng + ?Sized>(list: &'a [T], rng: &mut R) -> Option<&'a T> {
    list.choose(rng)
}

/// Uppercases the first character and lowercases the rest.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Re-applies the capitalization style of `original` to `replacement`.
///
/// | `original` | result                         |
/// |------------|--------------------------------|
/// | `FOO`      | replacement uppercased         |
/// | `Foo`      | replacement capitalized        |
/// | `fOo`, `FoO` | replacement lowercased       |
pub fn apply_matched_case(original: &str, replacement: &str) -> String {
    let starts_upper = original
        .chars()
        .next()
        .is_some_and(|c| c.to_uppercase().eq(std::iter::once(c)));

    if starts_upper {
        if original == original.to_uppercase() {
            return replacement.to_uppercase();
        }
        if original == capitalize_first(original) {
            return capitalize_first(replacement);
        }
    }

    replacement.to_lowercase()
}
