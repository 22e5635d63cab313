//! Numeric-aware string comparison for version labels ("10" sorts after "2").

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

/// Compare two strings treating runs of ASCII digits as numbers.
///
/// Case-sensitive. Digit runs compare by value; on equal value the run with
/// fewer leading zeros sorts first. Strings that compare equal chunk by chunk
/// fall back to plain byte order so the result is a total order.
pub fn natural_cmp(lhs: &str, rhs: &str) -> Ordering {
    let mut left = lhs.chars().peekable();
    let mut right = rhs.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return lhs.cmp(rhs),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let ordering = compare_numbers(&take_digits(&mut left), &take_digits(&mut right));
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(l), Some(r)) => {
                if l != r {
                    return l.cmp(&r);
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
        digits.push(c);
        chars.next();
    }
    digits
}

fn compare_numbers(lhs: &str, rhs: &str) -> Ordering {
    let left = lhs.trim_start_matches('0');
    let right = rhs.trim_start_matches('0');

    left.len()
        .cmp(&right.len())
        .then_with(|| left.cmp(right))
        .then_with(|| lhs.len().cmp(&rhs.len()))
}
