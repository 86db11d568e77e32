use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::domain::{ApplicantInput, HomeOwnership, LoanIntent, PriorDefault};

/// Raw request body. Every field is kept loosely typed so validation can report
/// all problems at once instead of stopping at the first serde failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicantPayload {
    #[serde(default, alias = "person_age")]
    pub age: Option<Value>,
    #[serde(default, alias = "person_income")]
    pub income: Option<Value>,
    #[serde(default, alias = "person_emp_length")]
    pub employment_length_years: Option<Value>,
    #[serde(default, alias = "loan_amnt")]
    pub loan_amount: Option<Value>,
    #[serde(default)]
    pub loan_percent_income: Option<Value>,
    #[serde(default, alias = "cb_person_default_on_file")]
    pub has_prior_default: Option<Value>,
    #[serde(default, alias = "cb_person_cred_hist_length")]
    pub credit_history_length_years: Option<Value>,
    #[serde(default, alias = "person_home_ownership")]
    pub home_ownership: Option<Value>,
    #[serde(default)]
    pub loan_intent: Option<Value>,
}

impl From<&ApplicantInput> for ApplicantPayload {
    fn from(input: &ApplicantInput) -> Self {
        let flag = match input.has_prior_default {
            PriorDefault::Yes => "Y",
            PriorDefault::No => "N",
        };
        Self {
            age: Some(Value::from(input.age)),
            income: Some(Value::from(input.income)),
            employment_length_years: Some(Value::from(input.employment_length_years)),
            loan_amount: Some(Value::from(input.loan_amount)),
            loan_percent_income: input.loan_percent_income.map(Value::from),
            has_prior_default: Some(Value::from(flag)),
            credit_history_length_years: Some(Value::from(input.credit_history_length_years)),
            home_ownership: Some(Value::from(input.home_ownership.code())),
            loan_intent: Some(Value::from(input.loan_intent.code())),
        }
    }
}

/// Category of a single field constraint failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    Missing,
    InvalidType,
    NotFinite,
    BelowMinimum,
    AboveMaximum,
    NotAllowed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub kind: ViolationKind,
    pub message: String,
}

/// Every constraint the payload broke. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.violations.iter().map(|violation| violation.field)
    }

    pub fn violation_for(&self, field: &str) -> Option<&FieldViolation> {
        self.violations
            .iter()
            .find(|violation| violation.field == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let details: Vec<&str> = self
            .violations
            .iter()
            .map(|violation| violation.message.as_str())
            .collect();
        write!(f, "invalid applicant: {}", details.join("; "))
    }
}

impl std::error::Error for ValidationError {}

/// Build an [`ApplicantInput`] or report every violated field constraint.
pub fn validate(payload: ApplicantPayload) -> Result<ApplicantInput, ValidationError> {
    let mut checker = FieldChecker::default();

    let age = checker.integer("age", payload.age.as_ref(), 18, Some(100));
    let income = checker.integer("income", payload.income.as_ref(), 0, None);
    let employment_length_years = checker.float(
        "employment_length_years",
        payload.employment_length_years.as_ref(),
        Some(0.0),
    );
    let loan_amount = checker.integer("loan_amount", payload.loan_amount.as_ref(), 0, None);
    let loan_percent_income = match payload.loan_percent_income.as_ref() {
        None | Some(Value::Null) => Some(None),
        value => checker
            .float("loan_percent_income", value, None)
            .map(Some),
    };
    let has_prior_default = checker.category(
        "has_prior_default",
        payload.has_prior_default.as_ref(),
        &["Y", "N"],
        PriorDefault::from_flag,
    );
    let credit_history_length_years = checker.integer(
        "credit_history_length_years",
        payload.credit_history_length_years.as_ref(),
        0,
        Some(i64::from(u32::MAX)),
    );
    let home_ownership = checker.category(
        "home_ownership",
        payload.home_ownership.as_ref(),
        &["RENT", "MORTGAGE", "OWN", "OTHER"],
        HomeOwnership::from_code,
    );
    let loan_intent = checker.category(
        "loan_intent",
        payload.loan_intent.as_ref(),
        &[
            "PERSONAL",
            "EDUCATION",
            "DEBT_CONSOLIDATION",
            "HOME_IMPROVEMENT",
            "MEDICAL",
            "VENTURE",
        ],
        LoanIntent::from_code,
    );

    match (
        age,
        income,
        employment_length_years,
        loan_amount,
        loan_percent_income,
        has_prior_default,
        credit_history_length_years,
        home_ownership,
        loan_intent,
    ) {
        (
            Some(age),
            Some(income),
            Some(employment_length_years),
            Some(loan_amount),
            Some(loan_percent_income),
            Some(has_prior_default),
            Some(credit_history_length_years),
            Some(home_ownership),
            Some(loan_intent),
        ) if checker.violations.is_empty() => Ok(ApplicantInput {
            // Bounds were checked above, so the narrowing cannot truncate.
            age: age as u32,
            income: income as u64,
            employment_length_years,
            loan_amount: loan_amount as u64,
            loan_percent_income,
            has_prior_default,
            credit_history_length_years: credit_history_length_years as u32,
            home_ownership,
            loan_intent,
        }),
        _ => Err(ValidationError {
            violations: checker.violations,
        }),
    }
}

#[derive(Default)]
struct FieldChecker {
    violations: Vec<FieldViolation>,
}

impl FieldChecker {
    fn reject(&mut self, field: &'static str, kind: ViolationKind, message: String) {
        self.violations.push(FieldViolation {
            field,
            kind,
            message,
        });
    }

    fn present<'a>(&mut self, field: &'static str, value: Option<&'a Value>) -> Option<&'a Value> {
        match value {
            None | Some(Value::Null) => {
                self.reject(field, ViolationKind::Missing, format!("{field} is required"));
                None
            }
            Some(value) => Some(value),
        }
    }

    fn integer(
        &mut self,
        field: &'static str,
        value: Option<&Value>,
        min: i64,
        max: Option<i64>,
    ) -> Option<i64> {
        let value = self.present(field, value)?;
        let parsed = value.as_i64().or_else(|| {
            value
                .as_f64()
                .filter(|number| number.is_finite() && number.fract() == 0.0)
                .filter(|number| number.abs() < i64::MAX as f64)
                .map(|number| number as i64)
        });
        let Some(number) = parsed else {
            self.reject(
                field,
                ViolationKind::InvalidType,
                format!("{field} must be an integer (got {value})"),
            );
            return None;
        };

        if number < min {
            self.reject(
                field,
                ViolationKind::BelowMinimum,
                format!("{field} must be >= {min} (got {number})"),
            );
            return None;
        }
        if let Some(max) = max {
            if number > max {
                self.reject(
                    field,
                    ViolationKind::AboveMaximum,
                    format!("{field} must be <= {max} (got {number})"),
                );
                return None;
            }
        }
        Some(number)
    }

    fn float(&mut self, field: &'static str, value: Option<&Value>, min: Option<f64>) -> Option<f64> {
        let value = self.present(field, value)?;
        let Some(number) = value.as_f64() else {
            self.reject(
                field,
                ViolationKind::InvalidType,
                format!("{field} must be a number (got {value})"),
            );
            return None;
        };
        if !number.is_finite() {
            self.reject(
                field,
                ViolationKind::NotFinite,
                format!("{field} must be finite"),
            );
            return None;
        }
        if let Some(min) = min {
            if number < min {
                self.reject(
                    field,
                    ViolationKind::BelowMinimum,
                    format!("{field} must be >= {min} (got {number})"),
                );
                return None;
            }
        }
        Some(number)
    }

    fn category<T>(
        &mut self,
        field: &'static str,
        value: Option<&Value>,
        allowed: &[&str],
        parse: impl Fn(&str) -> Option<T>,
    ) -> Option<T> {
        let value = self.present(field, value)?;
        let Some(raw) = value.as_str() else {
            self.reject(
                field,
                ViolationKind::InvalidType,
                format!("{field} must be a string (got {value})"),
            );
            return None;
        };
        let parsed = parse(raw);
        if parsed.is_none() {
            self.reject(
                field,
                ViolationKind::NotAllowed,
                format!("{field} must be one of {} (got '{raw}')", allowed.join(", ")),
            );
        }
        parsed
    }
}
