use super::domain::{Decision, Explanation, PredictionResponse, PredictionResult};

/// Invalid combination of pricing and decision dials.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PolicyError {
    #[error("accept threshold must be a finite probability in [0, 1] (got {0})")]
    Threshold(f64),
    #[error("rate band bounds must be finite (got {floor}..{ceiling})")]
    NonFiniteBand { floor: f64, ceiling: f64 },
    #[error("rate floor {floor} exceeds rate ceiling {ceiling}")]
    InvertedBand { floor: f64, ceiling: f64 },
}

/// Maps a default probability to a price and a lending decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingPolicy {
    accept_threshold: f64,
    rate_floor: f64,
    rate_ceiling: f64,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            accept_threshold: 0.35,
            rate_floor: 7.0,
            rate_ceiling: 18.0,
        }
    }
}

impl PricingPolicy {
    pub fn new(accept_threshold: f64, rate_floor: f64, rate_ceiling: f64) -> Result<Self, PolicyError> {
        if !accept_threshold.is_finite() || !(0.0..=1.0).contains(&accept_threshold) {
            return Err(PolicyError::Threshold(accept_threshold));
        }
        if !rate_floor.is_finite() || !rate_ceiling.is_finite() {
            return Err(PolicyError::NonFiniteBand {
                floor: rate_floor,
                ceiling: rate_ceiling,
            });
        }
        if rate_floor > rate_ceiling {
            return Err(PolicyError::InvertedBand {
                floor: rate_floor,
                ceiling: rate_ceiling,
            });
        }

        Ok(Self {
            accept_threshold,
            rate_floor,
            rate_ceiling,
        })
    }

    pub fn with_threshold(self, accept_threshold: f64) -> Result<Self, PolicyError> {
        Self::new(accept_threshold, self.rate_floor, self.rate_ceiling)
    }

    pub fn accept_threshold(&self) -> f64 {
        self.accept_threshold
    }

    pub fn rate_floor(&self) -> f64 {
        self.rate_floor
    }

    pub fn rate_ceiling(&self) -> f64 {
        self.rate_ceiling
    }

    /// Linear price across the band, clamped to the band endpoints.
    pub fn interest_rate(&self, p_default: f64) -> f64 {
        let rate = self.rate_floor + (self.rate_ceiling - self.rate_floor) * p_default;
        rate.clamp(self.rate_floor, self.rate_ceiling)
    }

    /// Accept strictly below the threshold.
    pub fn decide(&self, p_default: f64) -> Decision {
        if p_default < self.accept_threshold {
            Decision::Accept
        } else {
            Decision::Reject
        }
    }

    pub fn note(&self) -> String {
        format!(
            "Interest rate mapped linearly from predicted default probability ({}%–{}%).",
            self.rate_floor, self.rate_ceiling
        )
    }

    pub fn explanation(&self) -> Explanation {
        Explanation {
            threshold_used: self.accept_threshold,
            note: self.note(),
        }
    }
}

impl PredictionResult {
    /// Presentation view: probability to 4 places, rate to 2.
    pub fn response(&self, policy: &PricingPolicy) -> PredictionResponse {
        PredictionResponse {
            default_probability: round_to(self.default_probability, 4),
            interest_rate_percent: round_to(self.interest_rate_percent, 2),
            decision: self.decision,
            explain: policy.explanation(),
        }
    }
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}
