//! Labelled demographic and coding fields in referrals and notes.

use std::sync::LazyLock;

use regex::Regex;

static PATIENT_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)\b(?:(?:patient\s*id|mrn|medical\s+record\s+number)\b|medical\s+record\s+no\b\.?)\s*[:#]?\s*([A-Za-z0-9][A-Za-z0-9\-]*)",
    )
    .expect("Invalid patient id regex")
});

static FULL_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*(?:patient\s+name|patient|name)\s*:\s*([^\n,;]+)")
        .expect("Invalid name regex")
});

static FIRST_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*(?:first|given)\s*name\s*:\s*([^\n,;]+)").expect("Invalid first name regex")
});

static LAST_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*(?:last\s*name|surname|family\s*name)\s*:\s*([^\n,;]+)")
        .expect("Invalid last name regex")
});

static DATE_OF_BIRTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:dob|d\.o\.b\.?|date\s+of\s+birth)\s*[:\-]?\s*([0-9]{1,4}[/\-.][0-9]{1,2}[/\-.][0-9]{1,4})",
    )
    .expect("Invalid DOB regex")
});

/// `Diagnosis: I10`, `ICD-10: E11.9`, `Dx: Hypertension (I10)`.
static DIAGNOSIS_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:icd-?10(?:\s+code)?|diagnosis\s+code|diagnosis|dx)\s*[:#\-]\s*(?:[A-Za-z ]+\()?([A-Za-z0-9]{1,3}(?:\.[A-Za-z0-9]{1,4})?)\b",
    )
    .expect("Invalid diagnosis code regex")
});

/// Identity and coding fields as written in the source. Nothing is corrected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityFields {
    pub patient_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub diagnosis_code: Option<String>,
}

pub fn parse_identity(text: &str) -> IdentityFields {
    let mut fields = IdentityFields {
        patient_id: capture(&PATIENT_ID, text),
        first_name: capture(&FIRST_NAME, text),
        last_name: capture(&LAST_NAME, text),
        date_of_birth: capture(&DATE_OF_BIRTH, text),
        diagnosis_code: capture(&DIAGNOSIS_CODE, text),
    };

    // "Name: John Doe" fills whichever part is still missing
    if fields.first_name.is_none() || fields.last_name.is_none() {
        if let Some(full) = capture(&FULL_NAME, text) {
            let (first, last) = split_full_name(&full);
            fields.first_name = fields.first_name.or(first);
            fields.last_name = fields.last_name.or(last);
        }
    }

    fields
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// "John Doe" → (John, Doe); "Doe, John" is not split on comma because the
/// capture stops there. Middle names stay with the first name.
fn split_full_name(full: &str) -> (Option<String>, Option<String>) {
    let parts: Vec<&str> = full.split_whitespace().collect();
    match parts.as_slice() {
        [] => (None, None),
        [only] => (Some(only.to_string()), None),
        [rest @ .., last] => (Some(rest.join(" ")), Some(last.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEAN_REFERRAL: &str = "REFERRAL\n\
        Patient ID: P-998877\n\
        Name: John Doe\n\
        DOB: 1980-05-12\n\
        Diagnosis: I10\n\
        Reason: elevated blood pressure readings";

    #[test]
    fn clean_referral_fields() {
        let fields = parse_identity(CLEAN_REFERRAL);
        assert_eq!(fields.patient_id.as_deref(), Some("P-998877"));
        assert_eq!(fields.first_name.as_deref(), Some("John"));
        assert_eq!(fields.last_name.as_deref(), Some("Doe"));
        assert_eq!(fields.date_of_birth.as_deref(), Some("1980-05-12"));
        assert_eq!(fields.diagnosis_code.as_deref(), Some("I10"));
    }

    #[test]
    fn noisy_code_kept_verbatim() {
        let fields = parse_identity("Dx: 110\nName: J0hn Doe");
        assert_eq!(fields.diagnosis_code.as_deref(), Some("110"));
        assert_eq!(fields.first_name.as_deref(), Some("J0hn"));
    }

    #[test]
    fn code_in_parentheses() {
        let fields = parse_identity("Diagnosis: Hypertension (I10)");
        assert_eq!(fields.diagnosis_code.as_deref(), Some("I10"));
    }

    #[test]
    fn dotted_icd_code() {
        let fields = parse_identity("ICD-10: E11.9");
        assert_eq!(fields.diagnosis_code.as_deref(), Some("E11.9"));
    }

    #[test]
    fn diagnosis_word_without_code() {
        let fields = parse_identity("Diagnosis: Hypertension");
        assert_eq!(fields.diagnosis_code, None);
    }

    #[test]
    fn explicit_first_and_last_names() {
        let fields = parse_identity("First name: Mary Ann\nSurname: Smith");
        assert_eq!(fields.first_name.as_deref(), Some("Mary Ann"));
        assert_eq!(fields.last_name.as_deref(), Some("Smith"));
    }

    #[test]
    fn mrn_and_date_of_birth_label() {
        let fields = parse_identity("MRN 00123-A, date of birth 12/05/1980");
        assert_eq!(fields.patient_id.as_deref(), Some("00123-A"));
        assert_eq!(fields.date_of_birth.as_deref(), Some("12/05/1980"));
    }

    #[test]
    fn identified_is_not_an_id_label() {
        let fields = parse_identity("Patient identified by wristband. Cough.");
        assert_eq!(fields.patient_id, None);

        let fields = parse_identity("Medical record no. 4471");
        assert_eq!(fields.patient_id.as_deref(), Some("4471"));
    }

    #[test]
    fn patient_id_label_not_taken_as_name() {
        let fields = parse_identity("Patient ID: P-1");
        assert_eq!(fields.first_name, None);
    }

    #[test]
    fn free_note_has_no_identity() {
        let fields = parse_identity("Patient has a cough.");
        assert_eq!(fields, IdentityFields::default());
    }

    #[test]
    fn full_name_split() {
        assert_eq!(
            split_full_name("Anna Maria Rossi"),
            (Some("Anna Maria".into()), Some("Rossi".into()))
        );
        assert_eq!(split_full_name("Cher"), (Some("Cher".into()), None));
    }
}
