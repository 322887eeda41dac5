/// Convert spreadsheet column letters to a zero-based index (A=0, Z=25, AA=26).
///
/// Letters are case-insensitive. Returns `None` for an empty string, any
/// non-letter character, or a column too large to index.
pub fn column_to_index(letters: &str) -> Option<usize> {
    let letters = letters.trim();
    if letters.is_empty() {
        return None;
    }

    let mut n: usize = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        n = n.checked_mul(26)?.checked_add(digit)?;
    }
    Some(n - 1)
}

/// Convert a zero-based column index to spreadsheet letters (0=A, 25=Z, 26=AA).
pub fn index_to_column(index: usize) -> String {
    let mut n = index;
    let mut s = String::new();
    loop {
        let r = (n % 26) as u8;
        s.insert(0, (b'A' + r) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    s
}
