//! Applicant -> model input row.
//!
//! The row mirrors the frame the classifier was trained on: eight numeric
//! columns (two of them derived), followed by one-hot indicators for home
//! ownership and loan intent. Column order is decided by [`ColumnOrder`], which
//! either follows the schema the predictor declares or falls back to sorting by
//! name when the predictor declares none.

mod grade;

pub use grade::{
    auto_assign_grade, grade_for_score, score_components, GradeBreakdown, BEST_GRADE, WORST_GRADE,
};

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::domain::{ApplicantInput, HomeOwnership, LoanIntent};

pub const PERSON_AGE: &str = "person_age";
pub const PERSON_INCOME: &str = "person_income";
pub const PERSON_EMP_LENGTH: &str = "person_emp_length";
pub const LOAN_AMOUNT: &str = "loan_amnt";
pub const LOAN_PERCENT_INCOME: &str = "loan_percent_income";
pub const PRIOR_DEFAULT_FLAG: &str = "cb_person_default_on_file";
pub const CREDIT_HISTORY_LENGTH: &str = "cb_person_cred_hist_length";
pub const LOAN_GRADE: &str = "loan_grade";

/// Numeric columns in training order, before the one-hot blocks.
pub const BASE_FEATURES: [&str; 8] = [
    PERSON_AGE,
    PERSON_INCOME,
    PERSON_EMP_LENGTH,
    LOAN_AMOUNT,
    LOAN_PERCENT_INCOME,
    PRIOR_DEFAULT_FLAG,
    CREDIT_HISTORY_LENGTH,
    LOAN_GRADE,
];

/// Ordered feature name -> value row handed to the predictor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVector {
    columns: Vec<(String, f64)>,
}

impl FeatureVector {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            columns: Vec::with_capacity(capacity),
        }
    }

    /// Set a column, overwriting in place if the name is already present.
    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        match self.columns.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.columns.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.columns
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| *value)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> Vec<f64> {
        self.columns.iter().map(|(_, value)| *value).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.columns
            .iter()
            .map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl FromIterator<(String, f64)> for FeatureVector {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut row = FeatureVector::default();
        for (name, value) in iter {
            row.set(name, value);
        }
        row
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// How the assembled row is aligned before prediction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnOrder {
    /// The predictor's own feature list; the row is reshaped to exactly this.
    Declared(Vec<String>),
    /// No declared schema. Columns are sorted by name, which may not match the
    /// order the model was trained with.
    Lexicographic,
}

impl ColumnOrder {
    pub fn from_schema(schema: Option<&[String]>) -> Self {
        match schema {
            Some(names) => Self::Declared(names.to_vec()),
            None => Self::Lexicographic,
        }
    }

    pub fn is_declared(&self) -> bool {
        matches!(self, Self::Declared(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Declared(_) => "declared",
            Self::Lexicographic => "lexicographic",
        }
    }

    pub fn apply(&self, row: FeatureVector) -> FeatureVector {
        match self {
            Self::Declared(schema) => reconcile(&row, schema),
            Self::Lexicographic => order_lexicographically(row),
        }
    }
}

/// Reshape `row` to `schema`: declared columns missing from the row become 0,
/// columns the schema does not name are dropped, and the result follows the
/// schema's order.
pub fn reconcile(row: &FeatureVector, schema: &[String]) -> FeatureVector {
    FeatureVector {
        columns: schema
            .iter()
            .map(|name| (name.clone(), row.get(name).unwrap_or(0.0)))
            .collect(),
    }
}

/// Stable fallback ordering by column name; NaN cells become 0.
pub fn order_lexicographically(row: FeatureVector) -> FeatureVector {
    let mut columns: Vec<(String, f64)> = row
        .columns
        .into_iter()
        .map(|(name, value)| (name, if value.is_nan() { 0.0 } else { value }))
        .collect();
    columns.sort_by(|(left, _), (right, _)| left.cmp(right));
    FeatureVector { columns }
}

/// Base numeric columns followed by the one-hot blocks, in training order.
/// The row is not yet aligned to any predictor schema.
pub fn assemble_row(applicant: &ApplicantInput) -> FeatureVector {
    let dti = applicant.effective_dti();
    let has_prior_default = applicant.has_prior_default.is_yes();
    let loan_grade = auto_assign_grade(
        applicant.income,
        dti,
        applicant.credit_history_length_years,
        has_prior_default,
    );

    let mut row = FeatureVector::with_capacity(
        BASE_FEATURES.len() + HomeOwnership::ALL.len() + LoanIntent::ALL.len(),
    );
    row.set(PERSON_AGE, f64::from(applicant.age));
    row.set(PERSON_INCOME, applicant.income as f64);
    row.set(PERSON_EMP_LENGTH, applicant.employment_length_years);
    row.set(LOAN_AMOUNT, applicant.loan_amount as f64);
    row.set(LOAN_PERCENT_INCOME, dti);
    row.set(PRIOR_DEFAULT_FLAG, indicator(has_prior_default));
    row.set(
        CREDIT_HISTORY_LENGTH,
        f64::from(applicant.credit_history_length_years),
    );
    row.set(LOAN_GRADE, f64::from(loan_grade));

    for category in HomeOwnership::ALL {
        row.set(
            category.feature_name(),
            indicator(category == applicant.home_ownership),
        );
    }
    for intent in LoanIntent::ALL {
        row.set(intent.feature_name(), indicator(intent == applicant.loan_intent));
    }

    row
}

/// Assemble the applicant's row and align it with `order`.
pub fn engineer(applicant: &ApplicantInput, order: &ColumnOrder) -> FeatureVector {
    order.apply(assemble_row(applicant))
}

fn indicator(flag: bool) -> f64 {
    if flag {
        1.0
    } else {
        0.0
    }
}
