/// Reduces a phone number to the digits used for matching. A leading `+` or
/// `00` international prefix becomes `+`; extensions are dropped.
pub fn normalize_phone_for_match(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (mut out, rest) = if let Some(rest) = trimmed.strip_prefix('+') {
        (String::from("+"), rest)
    } else if let Some(rest) = trimmed.strip_prefix("00") {
        (String::from("+"), rest)
    } else {
        (String::new(), trimmed)
    };

    let mut saw_digit = false;
    for ch in rest.chars() {
        if ch.is_ascii_digit() {
            out.push(ch);
            saw_digit = true;
            continue;
        }

        if matches!(ch, 'x' | 'X' | '#' | ';' | ',') {
            if !saw_digit {
                return None;
            }
            break;
        }
    }

    if !saw_digit {
        return None;
    }

    Some(out)
}
