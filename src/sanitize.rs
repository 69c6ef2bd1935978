// ABOUTME: Input validation and merge-field sanitization helpers
// ABOUTME: Email/URL shape checks plus diacritic folding for audience sync fields
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Validation and sanitization of lead input.
//!
//! Validation gates what is persisted; sanitization only shapes the merge
//! fields sent to the audience platform, which rejects most non-ASCII and
//! punctuation in custom fields.

/// Validate an email against the simple `local@domain.tld` shape.
///
/// Deliberately loose: one `@` with a non-empty local part and a dotted
/// domain whose final label is non-empty. No whitespace anywhere.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = email.splitn(2, '@');
    let (Some(local), Some(domain)) = (parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let Some(dot) = domain.rfind('.') else {
        return false;
    };
    dot > 0 && dot + 1 < domain.len()
}

/// Accept only absolute http/https URLs
#[must_use]
pub fn is_http_url(url: &str) -> bool {
    let rest = if let Some(r) = url.strip_prefix("https://") {
        r
    } else if let Some(r) = url.strip_prefix("http://") {
        r
    } else {
        return false;
    };
    !rest.is_empty() && !rest.chars().any(char::is_whitespace)
}

/// Fold a single character to its unaccented ASCII base, if it has one
const fn fold_diacritic(c: char) -> Option<char> {
    Some(match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' => 'a',
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' | 'Ā' | 'Ă' => 'A',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' => 'e',
        'È' | 'É' | 'Ê' | 'Ë' | 'Ē' | 'Ė' | 'Ę' => 'E',
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' => 'i',
        'Ì' | 'Í' | 'Î' | 'Ï' | 'Ī' | 'Į' => 'I',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' => 'o',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' | 'Ō' => 'O',
        'ù' | 'ú' | 'û' | 'ü' | 'ū' => 'u',
        'Ù' | 'Ú' | 'Û' | 'Ü' | 'Ū' => 'U',
        'ç' | 'ć' | 'č' => 'c',
        'Ç' | 'Ć' | 'Č' => 'C',
        'ñ' | 'ń' => 'n',
        'Ñ' | 'Ń' => 'N',
        'ý' | 'ÿ' => 'y',
        'Ý' => 'Y',
        'š' | 'ś' => 's',
        'Š' | 'Ś' => 'S',
        'ž' | 'ź' | 'ż' => 'z',
        'Ž' | 'Ź' | 'Ż' => 'Z',
        _ => return None,
    })
}

/// Sanitize a free-text merge field: strip diacritics, replace everything
/// that is not ASCII alphanumeric with a space, and collapse runs of spaces.
#[must_use]
pub fn sanitize_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_was_space = true;
    for c in input.chars() {
        let folded = fold_diacritic(c).unwrap_or(c);
        if folded.is_ascii_alphanumeric() {
            out.push(folded);
            last_was_space = false;
        } else if !last_was_space {
            out.push(' ');
            last_was_space = true;
        }
    }
    out.trim_end().to_owned()
}

/// Keep only the digits of a phone number
#[must_use]
pub fn sanitize_phone(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

/// Pass a URL through only when its scheme is http/https
#[must_use]
pub fn sanitize_url(url: &str) -> Option<&str> {
    is_http_url(url).then_some(url)
}
