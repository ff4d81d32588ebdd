use crate::{
    error::{err, Error},
    util::escape,
};

/// Parses an unsigned decimal integer from the beginning of `input`,
/// consuming as many ASCII digits as are present (at least one). Returns
/// the parsed value and the unconsumed remainder.
///
/// An error is returned if no digits are present or if the value would
/// overflow an `i64`.
pub(crate) fn uint(input: &[u8]) -> Result<(i64, &[u8]), Error> {
    let mut value: i64 = 0;
    let mut digits = 0;
    while digits < input.len() && input[digits].is_ascii_digit() {
        let d = i64::from(input[digits] - b'0');
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(d))
            .ok_or_else(|| {
                err!(
                    "number '{}' too big to parse into 64-bit integer",
                    escape::Bytes(&input[..digits + 1]),
                )
            })?;
        digits += 1;
    }
    if digits == 0 {
        return Err(err!(
            "invalid number, no digits found in {:?}",
            escape::Bytes(&input[..input.len().min(10)]),
        ));
    }
    Ok((value, &input[digits..]))
}

/// Like `uint`, but consumes at most `max_digits` digits.
pub(crate) fn uint_up_to(
    input: &[u8],
    max_digits: usize,
) -> Result<(i64, &[u8]), Error> {
    let take = input
        .iter()
        .take(max_digits)
        .take_while(|b| b.is_ascii_digit())
        .count();
    let (value, _) = uint(&input[..take.max(1).min(input.len())])?;
    Ok((value, &input[take..]))
}

/// Parses an optionally signed decimal integer. A leading `-0` (a minus
/// sign on a zero value) is rejected, since every numeric field in this
/// crate treats it as nonsensical.
pub(crate) fn int(input: &[u8]) -> Result<(i64, &[u8]), Error> {
    let (negative, rest) = match input.first() {
        Some(&b'-') => (true, &input[1..]),
        Some(&b'+') => (false, &input[1..]),
        _ => (false, input),
    };
    let (value, rest) = uint(rest)?;
    if negative {
        if value == 0 {
            return Err(err!("negative zero is not a valid number"));
        }
        return Ok((-value, rest));
    }
    Ok((value, rest))
}

/// Splits `input` at `at`, or returns `None` when `input` is too short.
pub(crate) fn split(input: &[u8], at: usize) -> Option<(&[u8], &[u8])> {
    if at > input.len() {
        None
    } else {
        Some(input.split_at(at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_uint() {
        assert_eq!(uint(b"123").unwrap(), (123, &b""[..]));
        assert_eq!(uint(b"007x").unwrap(), (7, &b"x"[..]));
        assert!(uint(b"x").is_err());
        assert!(uint(b"").is_err());
        assert!(uint(b"99999999999999999999").is_err());
    }

    #[test]
    fn parse_int() {
        assert_eq!(int(b"-123").unwrap(), (-123, &b""[..]));
        assert_eq!(int(b"+123").unwrap(), (123, &b""[..]));
        assert_eq!(int(b"0").unwrap(), (0, &b""[..]));
        assert!(int(b"-0").is_err());
        assert!(int(b"--1").is_err());
    }

    #[test]
    fn parse_uint_up_to() {
        assert_eq!(uint_up_to(b"123456", 4).unwrap(), (1234, &b"56"[..]));
        assert_eq!(uint_up_to(b"12", 4).unwrap(), (12, &b""[..]));
        assert!(uint_up_to(b"", 4).is_err());
    }
}
