//! Lenient numeric reading for form text fields.

/// Reads the longest decimal prefix after leading whitespace, so `"12abc"`
/// reads as 12 and `"abc"` reads as nothing. Non-finite results are `None`.
pub fn leading_number(input: &str) -> Option<f64> {
    let text = input.trim_start();
    let bytes = text.as_bytes();

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    let integer_start = end;
    end = skip_digits(bytes, end);
    let mut digits = end - integer_start;

    if bytes.get(end) == Some(&b'.') {
        let fraction_end = skip_digits(bytes, end + 1);
        let fraction_digits = fraction_end - (end + 1);
        if digits + fraction_digits > 0 {
            end = fraction_end;
            digits += fraction_digits;
        }
    }

    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent_start = end + 1;
        if matches!(bytes.get(exponent_start), Some(b'+' | b'-')) {
            exponent_start += 1;
        }
        let exponent_end = skip_digits(bytes, exponent_start);
        if exponent_end > exponent_start {
            end = exponent_end;
        }
    }

    text[..end]
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

fn skip_digits(bytes: &[u8], mut index: usize) -> usize {
    while bytes.get(index).is_some_and(u8::is_ascii_digit) {
        index += 1;
    }
    index
}
