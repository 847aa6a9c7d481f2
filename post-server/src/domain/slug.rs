//! URL slugs for posts.
//!
//! A slug is derived once, when the post is inserted. Uniqueness is obtained
//! by counting the stored slugs that start with the base and appending
//! `-{count + 1}` when that count is non-zero.

const SEPARATOR: char = '-';
const FALLBACK_SLUG: &str = "post";

/// Lowercases `input`, keeps ASCII letters and digits, turns runs of
/// whitespace, `-` and `_` into a single `-` and drops everything else.
/// `@` is spelled out as `at`.
pub(crate) fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_separator = false;

    for ch in input.chars() {
        match ch {
            c if c.is_ascii_alphanumeric() => {
                push_char(&mut slug, &mut pending_separator, c.to_ascii_lowercase());
            }
            '@' => {
                pending_separator = true;
                for c in "at".chars() {
                    push_char(&mut slug, &mut pending_separator, c);
                }
                pending_separator = true;
            }
            c if c.is_whitespace() || c == '-' || c == '_' => pending_separator = true,
            _ => {}
        }
    }

    slug
}

fn push_char(slug: &mut String, pending_separator: &mut bool, ch: char) {
    if *pending_separator && !slug.is_empty() {
        slug.push(SEPARATOR);
    }
    *pending_separator = false;
    slug.push(ch);
}

/// Base slug for a title, never empty and never shaped like a post id.
pub(crate) fn base_slug(title: &str) -> String {
    let slug = slugify(title);
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else if has_uuid_shape(&slug) {
        format!("{FALLBACK_SLUG}{SEPARATOR}{slug}")
    } else {
        slug
    }
}

/// Canonical hyphenated UUID layout: 8-4-4-4-12 hex digits.
pub(crate) fn has_uuid_shape(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() == 36
        && bytes.iter().enumerate().all(|(idx, byte)| match idx {
            8 | 13 | 18 | 23 => *byte == b'-',
            _ => byte.is_ascii_hexdigit(),
        })
}

/// Picks the slug to store given how many existing slugs start with `base`.
pub(crate) fn deduplicate(base: &str, existing_with_prefix: i64) -> String {
    if existing_with_prefix <= 0 {
        base.to_string()
    } else {
        format!("{base}{SEPARATOR}{}", existing_with_prefix + 1)
    }
}
