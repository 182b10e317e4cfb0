use chrono::NaiveDate;

use super::domain::{CheckRequest, CheckSubmission, CheckType, Subject};

/// The only consent value that authorizes a check.
pub const CONSENT_AFFIRMATIVE: &str = "true";

/// Validation errors raised before any side effect takes place.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeViolation {
    #[error("Campos obrigatórios ausentes.")]
    MissingFields(Vec<&'static str>),
    #[error("Consentimento obrigatório.")]
    ConsentRequired,
    #[error("Tipo de verificação não suportado: {0}.")]
    UnsupportedCheckType(String),
    #[error("Data de nascimento inválida (use AAAA-MM-DD).")]
    InvalidDateOfBirth(String),
}

/// Guard turning raw form fields into a `CheckRequest`.
///
/// Order matters: required fields first, then consent, then the format of
/// the check type and date of birth.
#[derive(Debug, Clone, Default)]
pub struct IntakeGuard;

impl IntakeGuard {
    pub fn request_from_submission(
        &self,
        submission: CheckSubmission,
    ) -> Result<CheckRequest, IntakeViolation> {
        let CheckSubmission {
            name,
            cpf,
            dob,
            check_type,
            purpose,
            email,
            consent,
            file,
        } = submission;

        let mut missing = Vec::new();
        let name = required("name", name, &mut missing);
        let cpf = required("cpf", cpf, &mut missing);
        let dob = required("dob", dob, &mut missing);
        let check_type = required("checkType", check_type, &mut missing);
        let purpose = required("purpose", purpose, &mut missing);
        let email = required("email", email, &mut missing);

        let (Some(name), Some(cpf), Some(dob), Some(check_type), Some(purpose), Some(email)) =
            (name, cpf, dob, check_type, purpose, email)
        else {
            return Err(IntakeViolation::MissingFields(missing));
        };

        if consent.as_deref() != Some(CONSENT_AFFIRMATIVE) {
            return Err(IntakeViolation::ConsentRequired);
        }

        let check_type = CheckType::parse(&check_type)
            .ok_or(IntakeViolation::UnsupportedCheckType(check_type))?;
        let dob = NaiveDate::parse_from_str(&dob, "%Y-%m-%d")
            .map_err(|_| IntakeViolation::InvalidDateOfBirth(dob))?;

        Ok(CheckRequest {
            subject: Subject { name, cpf, dob },
            check_type,
            purpose,
            email,
            file,
        })
    }
}

fn required(
    field: &'static str,
    value: Option<String>,
    missing: &mut Vec<&'static str>,
) -> Option<String> {
    let value = value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty());
    if value.is_none() {
        missing.push(field);
    }
    value
}
