/// Sanitize extracted text before parsing.
/// Strips control and zero-width characters, collapses runs of spaces,
/// trims lines and drops blank ones. Clinical punctuation is untouched.
pub fn sanitize_extracted_text(raw: &str) -> String {
    raw.chars()
        .filter(|c| !is_invisible(*c))
        .map(|c| if c == '\t' { ' ' } else { c })
        .filter(|c| *c == '\n' || !c.is_control())
        .collect::<String>()
        .lines()
        .map(collapse_spaces)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Canonical form of a clinical term: lowercase, single-spaced, trimmed.
pub fn normalize_term(term: &str) -> String {
    collapse_spaces(&term.to_lowercase())
}

fn collapse_spaces(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Zero-width and bidi formatting characters that survive OCR and copy/paste.
fn is_invisible(c: char) -> bool {
    matches!(
        c,
        '\u{200B}'..='\u{200F}' | '\u{202A}'..='\u{202E}' | '\u{2060}' | '\u{FEFF}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_null_bytes() {
        let clean = sanitize_extracted_text("Patient: John\x00 Doe");
        assert!(!clean.contains('\x00'));
        assert_eq!(clean, "Patient: John Doe");
    }

    #[test]
    fn strips_control_characters() {
        let raw = "BP: 150/95\x01\x02\x03\nDOB: 1980-05-12";
        let clean = sanitize_extracted_text(raw);
        assert!(!clean.contains('\x01'));
        assert_eq!(clean, "BP: 150/95\nDOB: 1980-05-12");
    }

    #[test]
    fn strips_zero_width_characters() {
        let clean = sanitize_extracted_text("chest\u{200B} pain\u{FEFF}");
        assert_eq!(clean, "chest pain");
    }

    #[test]
    fn preserves_medical_punctuation() {
        let raw = "Temp: 38.5°C, BP: 120/80 mmHg (normal); SpO2 94%";
        assert_eq!(sanitize_extracted_text(raw), raw);
    }

    #[test]
    fn collapses_blank_lines_and_spaces() {
        let raw = "  History of   hypertension.\n\n\n\tDenies fever.  ";
        assert_eq!(
            sanitize_extracted_text(raw),
            "History of hypertension.\nDenies fever."
        );
    }

    #[test]
    fn empty_and_control_only_input() {
        assert_eq!(sanitize_extracted_text(""), "");
        assert_eq!(sanitize_extracted_text("\x00\x01\x02"), "");
    }

    #[test]
    fn normalize_term_lowercases_and_collapses() {
        assert_eq!(normalize_term("  Chest   Pain "), "chest pain");
        assert_eq!(normalize_term("Shortness of\nBreath"), "shortness of breath");
    }
}
