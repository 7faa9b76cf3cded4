use std::cmp::Ordering;

/// A run of either ASCII digits or everything else.
#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Number(&'a str),
    Text(&'a str),
}

fn segments(s: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_digits = None;
    for (i, c) in s.char_indices() {
        let digit = c.is_ascii_digit();
        match in_digits {
            Some(prev) if prev != digit => {
                out.push(segment(&s[start..i], prev));
                start = i;
            }
            _ => {}
        }
        in_digits = Some(digit);
    }
    if let Some(prev) = in_digits {
        out.push(segment(&s[start..], prev));
    }
    out
}

fn segment(s: &str, digits: bool) -> Segment<'_> {
    if digits {
        Segment::Number(s)
    } else {
        Segment::Text(s)
    }
}

/// Numeric comparison on digit strings of any length.
fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn cmp_text(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// Case-insensitive name equality, the rule that keeps catalog names unique.
pub fn same_name(a: &str, b: &str) -> bool {
    cmp_text(a, b) == Ordering::Equal
}

/// Natural ordering for product names, so "Jacks 5-15-26" sorts before
/// "Jacks 10-30-20".
///
/// Names are split into alternating digit and non-digit segments. Digit
/// segments compare numerically, text segments case-insensitively, and a
/// digit segment sorts before a text segment. When all shared segments are
/// equal the name with fewer segments comes first.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let sa = segments(a);
    let sb = segments(b);
    for (x, y) in sa.iter().zip(sb.iter()) {
        let ord = match (x, y) {
            (Segment::Number(x), Segment::Number(y)) => cmp_digits(x, y),
            (Segment::Text(x), Segment::Text(y)) => cmp_text(x, y),
            (Segment::Number(_), Segment::Text(_)) => Ordering::Less,
            (Segment::Text(_), Segment::Number(_)) => Ordering::Greater,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    sa.len().cmp(&sb.len())
}

/// Sort names in place using [`natural_cmp`].
pub fn sort_natural<S: AsRef<str>>(names: &mut [S]) {
    names.sort_by(|a, b| natural_cmp(a.as_ref(), b.as_ref()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_into_alternating_segments() {
        assert_eq!(
            segments("Jacks 5-15-26"),
            vec![
                Segment::Text("Jacks "),
                Segment::Number("5"),
                Segment::Text("-"),
                Segment::Number("15"),
                Segment::Text("-"),
                Segment::Number("26"),
            ]
        );
        assert!(segments("").is_empty());
    }

    #[test]
    fn numbers_compare_by_value() {
        assert_eq!(natural_cmp("Jacks 5-15-26", "Jacks 10-30-20"), Ordering::Less);
        assert_eq!(natural_cmp("x007", "x7"), Ordering::Equal);
        assert_eq!(
            natural_cmp("x99999999999999999999999", "x100000000000000000000000"),
            Ordering::Less
        );
    }

    #[test]
    fn text_is_case_insensitive_and_numbers_come_first() {
        assert_eq!(natural_cmp("calnit", "CalNit"), Ordering::Equal);
        assert_eq!(natural_cmp("5 Part", "Part"), Ordering::Less);
        assert_eq!(natural_cmp("Epsom", "Epsom Salt"), Ordering::Less);
    }
}
