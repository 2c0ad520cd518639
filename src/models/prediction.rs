use std::fmt;

use serde::Serialize;

const HIGH_RISK_RECOMMENDATIONS: &[&str] = &[
    "Enhanced discharge planning and patient education",
    "Follow-up appointment within 7 days",
    "Home health services if applicable",
    "Medication reconciliation",
    "Ensure patient understands medication regimen",
];

const LOW_RISK_RECOMMENDATIONS: &[&str] = &[
    "Standard discharge procedures",
    "Follow-up as per normal protocol",
    "Continue monitoring patient condition",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    HighRisk,
    LowRisk,
}

impl Verdict {
    /// Positive at or above the threshold.
    pub fn from_probability(probability: f64, threshold: f64) -> Self {
        if probability >= threshold {
            Self::HighRisk
        } else {
            Self::LowRisk
        }
    }

    pub fn recommendations(&self) -> &'static [&'static str] {
        match self {
            Self::HighRisk => HIGH_RISK_RECOMMENDATIONS,
            Self::LowRisk => LOW_RISK_RECOMMENDATIONS,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HighRisk => write!(f, "High Risk of Readmission"),
            Self::LowRisk => write!(f, "Low Risk of Readmission"),
        }
    }
}

/// Band shown next to the raw probability. Independent of the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    VeryLow,
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn from_probability(probability: f64) -> Self {
        if probability < 0.1 {
            Self::VeryLow
        } else if probability < 0.2 {
            Self::Low
        } else if probability < 0.3 {
            Self::Moderate
        } else {
            Self::High
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::VeryLow => "🟢 Very Low",
            Self::Low => "🟡 Low",
            Self::Moderate => "🟠 Moderate",
            Self::High => "🔴 High",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub verdict: Verdict,
    pub probability: f64,
    pub threshold: f64,
    pub risk_level: RiskLevel,
    pub recommendations: Vec<&'static str>,
}

impl Prediction {
    pub fn new(probability: f64, threshold: f64) -> Self {
        let verdict = Verdict::from_probability(probability, threshold);
        Self {
            verdict,
            probability,
            threshold,
            risk_level: RiskLevel::from_probability(probability),
            recommendations: verdict.recommendations().to_vec(),
        }
    }

    pub fn is_positive(&self) -> bool {
        self.verdict == Verdict::HighRisk
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.is_positive() { "⚠️" } else { "✅" };
        writeln!(f, "{marker} {}", self.verdict)?;
        writeln!(f, "Readmission probability: {:.2}%", self.probability * 100.0)?;
        writeln!(f, "Risk level: {}", self.risk_level)?;
        writeln!(f, "Recommendations:")?;
        for item in &self.recommendations {
            writeln!(f, "  - {item}")?;
        }
        Ok(())
    }
}
