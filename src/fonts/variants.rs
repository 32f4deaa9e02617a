//! Display ordering of a family's variants.

use std::cmp::Reverse;

use crate::fonts::FontVariant;

/// Orders variants as: `regular`, other upright weights ascending, then
/// italics with plain `italic` first and the rest by weight.
pub fn sort_variants(mut variants: Vec<FontVariant>) -> Vec<FontVariant> {
    variants.sort_by_key(|v| {
        let italic = v.name.contains("italic");
        (
            italic,
            Reverse(v.name == "regular" || v.name == "italic"),
            weight(&v.name),
        )
    });
    variants
}

/// Leading numeric weight of a variant name (`"700italic"` -> 700), 0 if none.
pub fn weight(name: &str) -> u32 {
    let digits: String = name.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}
