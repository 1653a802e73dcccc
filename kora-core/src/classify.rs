//! Classifiers that turn numbers and free text into display categories.

use std::f64::consts::PI;

/// Shared positive/negative/neutral tone for badges, signals and rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Negative,
    Neutral,
}

impl Tone {
    pub fn of_sign(value: f64) -> Self {
        if value > 0.0 {
            Tone::Positive
        } else if value < 0.0 {
            Tone::Negative
        } else {
            Tone::Neutral
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Tone::Positive => "positive",
            Tone::Negative => "negative",
            Tone::Neutral => "neutral",
        }
    }
}

// ── Valuation badge ──────────────────────────────────────────────────

/// Fair price must clear the current price by this fraction either way.
pub const VALUATION_BAND: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValuationBadge {
    /// Fair price more than 10 % above the current price.
    Undervalued { gap_pct: f64 },
    /// Fair price more than 10 % below the current price.
    Overvalued { gap_pct: f64 },
    Fair,
}

impl ValuationBadge {
    /// Without a positive current price there is nothing to compare against.
    pub fn classify(fair_price: f64, current_price: f64) -> Self {
        if current_price.is_nan() || current_price <= 0.0 || !fair_price.is_finite() {
            return ValuationBadge::Fair;
        }
        let gap_pct = (fair_price - current_price) / current_price * 100.0;
        if fair_price > current_price * (1.0 + VALUATION_BAND) {
            ValuationBadge::Undervalued { gap_pct }
        } else if fair_price < current_price * (1.0 - VALUATION_BAND) {
            ValuationBadge::Overvalued { gap_pct }
        } else {
            ValuationBadge::Fair
        }
    }

    pub fn label(&self) -> String {
        match self {
            ValuationBadge::Undervalued { gap_pct } => format!("저평가 (+{gap_pct:.1}%)"),
            ValuationBadge::Overvalued { gap_pct } => format!("고평가 ({gap_pct:.1}%)"),
            ValuationBadge::Fair => "적정 수준".to_string(),
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            ValuationBadge::Undervalued { .. } => "undervalued",
            ValuationBadge::Overvalued { .. } => "overvalued",
            ValuationBadge::Fair => "fair",
        }
    }
}

// ── Score gauge ──────────────────────────────────────────────────────

pub const GAUGE_RADIUS: f64 = 45.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Green,
    Blue,
    Amber,
    Red,
}

impl ScoreBand {
    pub fn of(score: f64) -> Self {
        match score {
            s if s >= 80.0 => ScoreBand::Green,
            s if s >= 60.0 => ScoreBand::Blue,
            s if s >= 40.0 => ScoreBand::Amber,
            _ => ScoreBand::Red,
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            ScoreBand::Green => "#10b981",
            ScoreBand::Blue => "#3b82f6",
            ScoreBand::Amber => "#f59e0b",
            ScoreBand::Red => "#ef4444",
        }
    }
}

/// Circular score gauge: the stroke is drawn for `score`% of the circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreGauge {
    pub score: f64,
    pub band: ScoreBand,
    pub circumference: f64,
    pub dash_offset: f64,
}

impl ScoreGauge {
    pub fn new(score: f64) -> Self {
        let score = score.clamp(0.0, 100.0);
        let circumference = 2.0 * PI * GAUGE_RADIUS;
        Self {
            score,
            band: ScoreBand::of(score),
            circumference,
            dash_offset: circumference - (score / 100.0) * circumference,
        }
    }

    /// Filled fraction in `0.0..=1.0`.
    pub fn ratio(&self) -> f64 {
        self.score / 100.0
    }
}

// ── Opinion ──────────────────────────────────────────────────────────

const BUY_TOKENS: [&str; 2] = ["매수", "buy"];
const SELL_TOKENS: [&str; 2] = ["매도", "sell"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opinion {
    Buy,
    Sell,
    Hold,
}

impl Opinion {
    /// Substring match on the opinion text; a buy token wins over a sell token.
    pub fn classify(text: &str) -> Self {
        let lower = text.to_lowercase();
        if BUY_TOKENS.iter().any(|t| lower.contains(t)) {
            Opinion::Buy
        } else if SELL_TOKENS.iter().any(|t| lower.contains(t)) {
            Opinion::Sell
        } else {
            Opinion::Hold
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Opinion::Buy => "buy",
            Opinion::Sell => "sell",
            Opinion::Hold => "hold",
        }
    }
}

// ── Technical signals and trend ──────────────────────────────────────

/// Tone of an RSI/MFI signal string such as "과매수" or "자금 유입".
pub fn signal_tone(signal: Option<&str>) -> Tone {
    let Some(signal) = signal else {
        return Tone::Neutral;
    };
    if signal.contains("강세") || signal.contains("유입") {
        Tone::Positive
    } else if signal.contains("약세") || signal.contains("유출") || signal.contains("과매") {
        Tone::Negative
    } else {
        Tone::Neutral
    }
}

pub fn trend_tone(trend: Option<&str>) -> Tone {
    match trend {
        Some("상승 추세") => Tone::Positive,
        Some("하락 추세") => Tone::Negative,
        _ => Tone::Neutral,
    }
}

pub fn sentiment_tone(sentiment: Option<&str>) -> Tone {
    match sentiment {
        Some("긍정") => Tone::Positive,
        Some("부정") => Tone::Negative,
        _ => Tone::Neutral,
    }
}

// ── Letter grades ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeTone {
    Excellent,
    Good,
    Average,
    Poor,
    Failing,
    Unknown,
}

impl GradeTone {
    pub fn of(grade: &str) -> Self {
        match grade.trim() {
            "A" | "A+" => GradeTone::Excellent,
            "B" | "B+" => GradeTone::Good,
            "C" => GradeTone::Average,
            "D" => GradeTone::Poor,
            "F" => GradeTone::Failing,
            _ => GradeTone::Unknown,
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            GradeTone::Excellent => "#10b981",
            GradeTone::Good => "#3b82f6",
            GradeTone::Average => "#f59e0b",
            GradeTone::Poor => "#f97316",
            GradeTone::Failing => "#ef4444",
            GradeTone::Unknown => "#6b7280",
        }
    }
}

// ── Financial ratio status ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatioStatus {
    Safe,
    Warning,
    Danger,
    NoData,
}

impl RatioStatus {
    pub fn label(self) -> &'static str {
        match self {
            RatioStatus::Safe => "양호",
            RatioStatus::Warning => "보통",
            RatioStatus::Danger => "주의",
            RatioStatus::NoData => "데이터 없음",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            RatioStatus::Safe => "safe",
            RatioStatus::Warning => "warning",
            RatioStatus::Danger => "danger",
            RatioStatus::NoData => "",
        }
    }
}

/// Thresholds for one ratio.
///
/// Higher-is-better: `>= good` is safe, `>= safe` is warning, else danger.
/// Lower-is-better: `<= safe` is safe, `<= good` is warning, else danger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioRule {
    pub safe: f64,
    pub good: f64,
    pub higher_is_better: bool,
}

impl RatioRule {
    pub const fn higher(safe: f64, good: f64) -> Self {
        Self { safe, good, higher_is_better: true }
    }

    pub const fn lower(safe: f64, good: f64) -> Self {
        Self { safe, good, higher_is_better: false }
    }

    pub fn classify(&self, value: Option<f64>) -> RatioStatus {
        let Some(v) = value.filter(|v| v.is_finite()) else {
            return RatioStatus::NoData;
        };
        if self.higher_is_better {
            if v >= self.good {
                RatioStatus::Safe
            } else if v >= self.safe {
                RatioStatus::Warning
            } else {
                RatioStatus::Danger
            }
        } else if v <= self.safe {
            RatioStatus::Safe
        } else if v <= self.good {
            RatioStatus::Warning
        } else {
            RatioStatus::Danger
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valuation_thresholds() {
        assert!(matches!(
            ValuationBadge::classify(120.0, 100.0),
            ValuationBadge::Undervalued { .. }
        ));
        assert_eq!(ValuationBadge::classify(95.0, 100.0), ValuationBadge::Fair);
        assert!(matches!(
            ValuationBadge::classify(85.0, 100.0),
            ValuationBadge::Overvalued { .. }
        ));
        // Exactly on the band edge is still fair.
        assert_eq!(ValuationBadge::classify(110.0, 100.0), ValuationBadge::Fair);
    }

    #[test]
    fn valuation_labels_carry_the_gap() {
        assert_eq!(ValuationBadge::classify(120.0, 100.0).label(), "저평가 (+20.0%)");
        assert_eq!(ValuationBadge::classify(85.0, 100.0).label(), "고평가 (-15.0%)");
        assert_eq!(ValuationBadge::classify(100.0, 100.0).label(), "적정 수준");
    }

    #[test]
    fn valuation_without_current_price_is_fair() {
        assert_eq!(ValuationBadge::classify(120.0, 0.0), ValuationBadge::Fair);
    }

    #[test]
    fn score_bands() {
        assert_eq!(ScoreBand::of(80.0), ScoreBand::Green);
        assert_eq!(ScoreBand::of(79.9), ScoreBand::Blue);
        assert_eq!(ScoreBand::of(60.0), ScoreBand::Blue);
        assert_eq!(ScoreBand::of(40.0), ScoreBand::Amber);
        assert_eq!(ScoreBand::of(39.0), ScoreBand::Red);
    }

    #[test]
    fn gauge_offset() {
        let full = ScoreGauge::new(100.0);
        assert!(full.dash_offset.abs() < 1e-9);
        let empty = ScoreGauge::new(0.0);
        assert!((empty.dash_offset - empty.circumference).abs() < 1e-9);
        let half = ScoreGauge::new(50.0);
        assert!((half.dash_offset - half.circumference / 2.0).abs() < 1e-9);
        assert_eq!(ScoreGauge::new(140.0).score, 100.0);
    }

    #[test]
    fn opinion_substrings() {
        assert_eq!(Opinion::classify("적극매수"), Opinion::Buy);
        assert_eq!(Opinion::classify("매도"), Opinion::Sell);
        assert_eq!(Opinion::classify("중립"), Opinion::Hold);
        assert_eq!(Opinion::classify("Strong BUY"), Opinion::Buy);
        assert_eq!(Opinion::classify("sell"), Opinion::Sell);
        assert_eq!(Opinion::classify(""), Opinion::Hold);
    }

    #[test]
    fn signal_and_sentiment_tones() {
        assert_eq!(signal_tone(Some("강세")), Tone::Positive);
        assert_eq!(signal_tone(Some("자금 유출")), Tone::Negative);
        assert_eq!(signal_tone(Some("과매도")), Tone::Negative);
        assert_eq!(signal_tone(Some("중립")), Tone::Neutral);
        assert_eq!(signal_tone(None), Tone::Neutral);
        assert_eq!(trend_tone(Some("상승 추세")), Tone::Positive);
        assert_eq!(sentiment_tone(Some("부정")), Tone::Negative);
    }

    #[test]
    fn grade_tones() {
        assert_eq!(GradeTone::of("A+"), GradeTone::Excellent);
        assert_eq!(GradeTone::of("B"), GradeTone::Good);
        assert_eq!(GradeTone::of("D"), GradeTone::Poor);
        assert_eq!(GradeTone::of("?"), GradeTone::Unknown);
    }

    #[test]
    fn ratio_rules_in_both_directions() {
        let current_ratio = RatioRule::higher(150.0, 200.0);
        assert_eq!(current_ratio.classify(Some(210.0)), RatioStatus::Safe);
        assert_eq!(current_ratio.classify(Some(160.0)), RatioStatus::Warning);
        assert_eq!(current_ratio.classify(Some(90.0)), RatioStatus::Danger);
        assert_eq!(current_ratio.classify(None), RatioStatus::NoData);

        let debt_ratio = RatioRule::lower(100.0, 200.0);
        assert_eq!(debt_ratio.classify(Some(80.0)), RatioStatus::Safe);
        assert_eq!(debt_ratio.classify(Some(150.0)), RatioStatus::Warning);
        assert_eq!(debt_ratio.classify(Some(250.0)), RatioStatus::Danger);
    }
}
