// src/render.rs
use crate::errors::PredictError;
use crate::models::PredictionResult;
use crate::page::escape_html;

pub const WONT_PURCHASE: &str = "Won't Purchase";
pub const WILL_PURCHASE: &str = "Will Purchase";
pub const ERROR_HINT: &str = "Please check your input and try again.";

/// Which way the classifier leaned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Positive,
    Negative,
}

impl Verdict {
    pub fn from_prediction(prediction: i64) -> Self {
        if prediction == 1 {
            Verdict::Positive
        } else {
            Verdict::Negative
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Verdict::Positive => "positive",
            Verdict::Negative => "negative",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Verdict::Positive => "fa-check-circle",
            Verdict::Negative => "fa-times-circle",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityRow {
    pub label: &'static str,
    pub value: String,
}

/// Everything shown for a successful prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionView {
    pub verdict: Verdict,
    pub message: String,
    /// Already formatted, e.g. `87.3%`.
    pub confidence: String,
    pub rows: [ProbabilityRow; 2],
}

impl PredictionView {
    pub fn from_result(result: &PredictionResult) -> Self {
        let percent = |p: f64| format!("{}%", to_fixed_1(p * 100.0));
        Self {
            verdict: Verdict::from_prediction(result.prediction),
            message: result.message.clone(),
            confidence: format!("{}%", to_fixed_1(result.confidence)),
            rows: [
                ProbabilityRow {
                    label: WONT_PURCHASE,
                    value: percent(result.probability.not_take_package),
                },
                ProbabilityRow {
                    label: WILL_PURCHASE,
                    value: percent(result.probability.take_package),
                },
            ],
        }
    }

    pub fn class_name(&self) -> String {
        format!("prediction-result {}", self.verdict.css_class())
    }

    pub fn row(&self, label: &str) -> Option<&str> {
        self.rows.iter().find(|r| r.label == label).map(|r| r.value.as_str())
    }

    pub fn result_html(&self) -> String {
        format!(
            "\n        <i class=\"fas {}\"></i>\n        {}\n    ",
            self.verdict.icon(),
            escape_html(&self.message)
        )
    }

    pub fn confidence_html(&self) -> String {
        format!(
            "\n        <i class=\"fas fa-chart-line\"></i>\n        Confidence: <strong>{}</strong>\n    ",
            self.confidence
        )
    }

    pub fn breakdown_html(&self) -> String {
        self.rows
            .iter()
            .map(|row| {
                format!(
                    "\n        <div class=\"probability-item\">\n            <div class=\"probability-label\">{}</div>\n            <div class=\"probability-value\">{}</div>\n        </div>",
                    escape_html(row.label),
                    escape_html(&row.value)
                )
            })
            .collect::<String>()
            + "\n    "
    }
}

/// Error card content.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorView {
    pub message: String,
}

impl ErrorView {
    pub fn from_error(error: &PredictError) -> Self {
        Self {
            message: error.user_message(),
        }
    }

    pub fn card_html(&self) -> String {
        format!(
            "\n        <div class=\"prediction-result error\">\n            <i class=\"fas fa-exclamation-triangle\"></i>\n            Error: {}\n        </div>\n        <div class=\"confidence-score\">\n            {}\n        </div>\n    ",
            escape_html(&self.message),
            ERROR_HINT
        )
    }
}

/// Formats with one decimal the way `Number.prototype.toFixed(1)` does,
/// including rounding exact halves away from zero (`62.25` → `62.3`).
pub fn to_fixed_1(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value < 0.0 {
        return format!("-{}", to_fixed_1(-value));
    }
    if value.is_infinite() {
        return "Infinity".to_string();
    }
    if value == 0.0 {
        return "0.0".to_string();
    }
    // Binary doubles only tie at one decimal when the fraction is .25 or .75,
    // i.e. value * 4 is an odd integer. `{:.1}` would round those to even.
    let quarters = value * 4.0;
    if quarters.fract() == 0.0 && quarters < 1e15 && (quarters as i64) % 2 != 0 {
        let tenths = (value * 10.0).ceil() as u64;
        return format!("{}.{}", tenths / 10, tenths % 10);
    }
    format!("{:.1}", value)
}
