#![allow(unsafe_code)]

//! Top-level comma splitting and the `\,` / `\\` escape convention.

#[cfg(test)]
#[path = "./split_tests.rs"]
mod tests;

use crate::Arena;

/// Strips the format's whitespace (`' '` and `'\t'`) from both ends.
#[inline]
pub fn trim(raw: &str) -> &str {
    raw.trim_matches([' ', '\t'])
}

/// Iterator over the top-level comma separated items of a raw value.
///
/// A comma does not split while it sits inside a `(...)` group or when the
/// byte before it is a backslash. Parentheses are only counted, never
/// matched, and an unbalanced `)` may drive the depth negative. Items are
/// returned untrimmed and still escaped.
///
/// ```
/// use lineconf::Split;
///
/// let items: Vec<&str> = Split::new("add(1,2),int(42),pow(2,3)").collect();
/// assert_eq!(items, ["add(1,2)", "int(42)", "pow(2,3)"]);
/// ```
#[derive(Clone, Debug)]
pub struct Split<'s> {
    source: &'s str,
    rest: &'s str,
    done: bool,
}

impl<'s> Split<'s> {
    /// Splits `source`. Empty input yields no items at all.
    pub fn new(source: &'s str) -> Self {
        Self {
            source,
            rest: source,
            done: source.is_empty(),
        }
    }

    /// Counts the items without advancing this iterator.
    pub fn item_count(&self) -> usize {
        self.clone().count()
    }

    /// Rewinds to the first item.
    pub fn reset(&mut self) {
        *self = Self::new(self.source);
    }
}

impl<'s> Iterator for Split<'s> {
    type Item = &'s str;

    fn next(&mut self) -> Option<&'s str> {
        if self.done {
            return None;
        }
        let bytes = self.rest.as_bytes();
        let mut depth: i32 = 0;
        for (i, &b) in bytes.iter().enumerate() {
            match b {
                b'(' => depth += 1,
                b')' => depth -= 1,
                // At i == 0 the preceding byte is the comma just consumed.
                b',' if depth == 0 && (i == 0 || bytes[i - 1] != b'\\') => {
                    let item = &self.rest[..i];
                    self.rest = &self.rest[i + 1..];
                    return Some(item);
                }
                _ => {}
            }
        }
        self.done = true;
        Some(self.rest)
    }
}

/// Resolves `\,` to `,` and `\\` to `\`.
///
/// A backslash before any other byte, or at the very end, is kept verbatim.
/// When `raw` holds no backslash it is returned as is; otherwise the result
/// is written into the arena.
///
/// ```
/// let arena = lineconf::Arena::new();
/// assert_eq!(lineconf::unescape(r"a\,b", &arena), "a,b");
/// assert_eq!(lineconf::unescape(r"a\\b", &arena), r"a\b");
/// assert_eq!(lineconf::unescape(r"a\nb", &arena), r"a\nb");
/// ```
pub fn unescape<'x>(raw: &'x str, arena: &'x Arena) -> &'x str {
    let bytes = raw.as_bytes();
    let Some(first) = bytes.iter().position(|&b| b == b'\\') else {
        return raw;
    };

    // Safety: nothing else allocates from the arena until `commit`.
    let mut scratch = unsafe { arena.scratch() };
    scratch.extend(&bytes[..first]);
    let mut i = first;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\\' {
            if let Some(&next @ (b',' | b'\\')) = bytes.get(i + 1) {
                scratch.push(next);
                i += 2;
                continue;
            }
        }
        scratch.push(b);
        i += 1;
    }
    let out = scratch.commit();
    // Safety: only ASCII backslashes were removed from valid UTF-8.
    unsafe { std::str::from_utf8_unchecked(out) }
}
