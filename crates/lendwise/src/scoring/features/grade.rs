//! Rule-based loan grade standing in for the bureau letter grade (A..G -> 1..7).

/// Best grade (A).
pub const BEST_GRADE: u8 = 1;
/// Worst grade (G).
pub const WORST_GRADE: u8 = 7;

/// Signed score contributions behind a grade, kept for display and audits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradeBreakdown {
    pub dti: i8,
    pub income: i8,
    pub credit_history: i8,
    pub prior_default: i8,
}

impl GradeBreakdown {
    pub fn score(&self) -> i8 {
        self.dti + self.income + self.credit_history + self.prior_default
    }

    pub fn grade(&self) -> u8 {
        grade_for_score(self.score())
    }
}

pub fn score_components(
    income: u64,
    dti: f64,
    credit_history_length: u32,
    has_prior_default: bool,
) -> GradeBreakdown {
    // Thresholds are inclusive and checked from the tightest band outwards.
    let dti = if dti <= 0.10 {
        3
    } else if dti <= 0.20 {
        2
    } else if dti <= 0.35 {
        1
    } else {
        0
    };

    let income = if income >= 100_000 {
        3
    } else if income >= 60_000 {
        2
    } else if income >= 30_000 {
        1
    } else {
        0
    };

    let credit_history = if credit_history_length >= 10 {
        2
    } else if credit_history_length >= 5 {
        1
    } else {
        0
    };

    let prior_default = if has_prior_default { -3 } else { 0 };

    GradeBreakdown {
        dti,
        income,
        credit_history,
        prior_default,
    }
}

/// Map a total score onto the 1..=7 grade bands, highest band first.
pub fn grade_for_score(score: i8) -> u8 {
    match score {
        s if s >= 7 => 1,
        5..=6 => 2,
        3..=4 => 3,
        2 => 4,
        1 => 5,
        0 => 6,
        _ => WORST_GRADE,
    }
}

/// Grade an applicant from income, effective DTI, credit history length and
/// prior-default status. A NaN DTI earns no DTI points.
pub fn auto_assign_grade(
    income: u64,
    dti: f64,
    credit_history_length: u32,
    has_prior_default: bool,
) -> u8 {
    score_components(income, dti, credit_history_length, has_prior_default).grade()
}
