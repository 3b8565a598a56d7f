//! Numeric-aware ("natural") string ordering used for segment labels.

use std::{
    cmp::Ordering,
    fmt::{Debug, Display},
    iter::Peekable,
    ops::Deref,
    str::Chars,
};

/// Compares two strings so that embedded digit runs compare by numeric value: `"2" < "10"`,
/// `"item9" < "item10"`. Non-digit characters compare by code point.
///
/// Digit runs that are numerically equal but differ in leading zeros are ordered by the plain string ordering
/// as a final tie-break, so the result is a total order consistent with string equality.
pub fn natural_cmp(left: &str, right: &str) -> Ordering {
    let mut l = left.chars().peekable();
    let mut r = right.chars().peekable();

    loop {
        match (l.peek().copied(), r.peek().copied()) {
            (None, None) => return left.cmp(right),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(lc), Some(rc)) if lc.is_ascii_digit() && rc.is_ascii_digit() => {
                let ld = digit_run(&mut l);
                let rd = digit_run(&mut r);
                let ord = cmp_digit_runs(&ld, &rd);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(lc), Some(rc)) => {
                let ord = lc.cmp(&rc);
                if ord != Ordering::Equal {
                    return ord;
                }
                l.next();
                r.next();
            }
        }
    }
}

fn digit_run(chars: &mut Peekable<Chars>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.next_if(char::is_ascii_digit) {
        run.push(c);
    }
    run
}

fn cmp_digit_runs(left: &str, right: &str) -> Ordering {
    let l = left.trim_start_matches('0');
    let r = right.trim_start_matches('0');
    l.len().cmp(&r.len()).then_with(|| l.cmp(r))
}

//=================
// NaturalKey

/// String key ordered by [`natural_cmp`]; used as the key of segment maps and sets.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct NaturalKey(pub String);

impl NaturalKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Ord for NaturalKey {
    fn cmp(&self, other: &Self) -> Ordering {
        natural_cmp(&self.0, &other.0)
    }
}

impl PartialOrd for NaturalKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Deref for NaturalKey {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl Debug for NaturalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for NaturalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl From<String> for NaturalKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for NaturalKey {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}
