use serde::{Deserialize, Serialize};

/// Applicant attributes that passed validation. Constructed by [`super::validate`]
/// or directly by callers that already hold trusted values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantInput {
    pub age: u32,
    pub income: u64,
    pub employment_length_years: f64,
    pub loan_amount: u64,
    pub loan_percent_income: Option<f64>,
    pub has_prior_default: PriorDefault,
    pub credit_history_length_years: u32,
    pub home_ownership: HomeOwnership,
    pub loan_intent: LoanIntent,
}

impl ApplicantInput {
    /// Debt-to-income ratio used for grading and as a model input. A supplied
    /// ratio wins unless it is NaN; otherwise it is derived from the loan and
    /// income, with zero income mapping to `0.0`.
    pub fn effective_dti(&self) -> f64 {
        match self.loan_percent_income {
            Some(ratio) if !ratio.is_nan() => ratio,
            _ if self.income > 0 => self.loan_amount as f64 / self.income as f64,
            _ => 0.0,
        }
    }
}

/// Whether the credit bureau has a prior default on file (`"Y"` / `"N"` on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriorDefault {
    #[serde(rename = "Y")]
    Yes,
    #[serde(rename = "N")]
    No,
}

impl PriorDefault {
    pub fn from_flag(flag: &str) -> Option<Self> {
        match flag {
            "Y" => Some(Self::Yes),
            "N" => Some(Self::No),
            _ => None,
        }
    }

    pub fn is_yes(self) -> bool {
        matches!(self, Self::Yes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HomeOwnership {
    Rent,
    Mortgage,
    Own,
    Other,
}

impl HomeOwnership {
    /// Category order used when the training frame was one-hot encoded.
    pub const ALL: [HomeOwnership; 4] = [Self::Rent, Self::Mortgage, Self::Own, Self::Other];

    pub fn code(self) -> &'static str {
        match self {
            Self::Rent => "RENT",
            Self::Mortgage => "MORTGAGE",
            Self::Own => "OWN",
            Self::Other => "OTHER",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.code() == code)
    }

    pub fn feature_name(self) -> String {
        format!("home_{}", self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanIntent {
    Personal,
    Education,
    DebtConsolidation,
    HomeImprovement,
    Medical,
    Venture,
}

impl LoanIntent {
    pub const ALL: [LoanIntent; 6] = [
        Self::Personal,
        Self::Education,
        Self::DebtConsolidation,
        Self::HomeImprovement,
        Self::Medical,
        Self::Venture,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::Personal => "PERSONAL",
            Self::Education => "EDUCATION",
            Self::DebtConsolidation => "DEBT_CONSOLIDATION",
            Self::HomeImprovement => "HOME_IMPROVEMENT",
            Self::Medical => "MEDICAL",
            Self::Venture => "VENTURE",
        }
    }

    /// Category label as it appeared in the training data (no underscores).
    pub fn training_code(self) -> &'static str {
        match self {
            Self::DebtConsolidation => "DEBTCONSOLIDATION",
            Self::HomeImprovement => "HOMEIMPROVEMENT",
            other => other.code(),
        }
    }

    /// Accepts both the underscored and the training spelling.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|intent| intent.code() == code || intent.training_code() == code)
    }

    pub fn feature_name(self) -> String {
        format!("loan_{}", self.training_code())
    }
}

/// Lending recommendation derived from the default probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    pub fn label(self) -> &'static str {
        match self {
            Self::Accept => "ACCEPT",
            Self::Reject => "REJECT",
        }
    }
}

/// Full-precision scoring outcome for one applicant.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub default_probability: f64,
    pub interest_rate_percent: f64,
    pub decision: Decision,
    pub loan_grade: u8,
    pub effective_dti: f64,
}

/// Wire body returned by `POST /predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub default_probability: f64,
    pub interest_rate_percent: f64,
    pub decision: Decision,
    pub explain: Explanation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub threshold_used: f64,
    pub note: String,
}
