//! Value transforms applied to raw row fields.

/// Remove whitespace that sits between two digits.
///
/// Leading and trailing whitespace, and whitespace next to non-digits, is
/// left alone: `" 555 123 4567 "` becomes `" 5551234567 "`.
pub fn normalize_phone_number(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());

    for (i, c) in chars.iter().enumerate() {
        if c.is_whitespace()
            && i > 0
            && chars[i - 1].is_ascii_digit()
            && chars.get(i + 1).map_or(false, |n| n.is_ascii_digit())
        {
            continue;
        }
        out.push(*c);
    }
    out
}

/// Call log numbers of zero or below mark withheld/unknown callers
pub fn call_number_label(raw: &str) -> String {
    let number = normalize_phone_number(raw);
    match number.trim().parse::<i64>() {
        Ok(value) if value <= 0 => "UNKNOWN".to_string(),
        _ => number,
    }
}

pub fn call_type_label(code: i64) -> String {
    match code {
        1 => "Received".to_string(),
        2 => "Dialled".to_string(),
        3 => "Missed".to_string(),
        5 => "Rejected".to_string(),
        other => format!("Type({})", other),
    }
}

pub fn sms_type_label(code: i64) -> String {
    match code {
        1 => "Inbox".to_string(),
        2 | 6 => "Sent".to_string(),
        3 => "Draft".to_string(),
        5 => "Sending failed".to_string(),
        other => format!("Type({})", other),
    }
}
