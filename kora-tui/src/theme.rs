//! Colour tokens and style helpers for the report viewer.
//!
//! Dark background with a cyan accent. Report tones map onto a fixed
//! palette: positive green, negative pink, neutral purple.

use ratatui::style::{Color, Modifier, Style};

use kora_core::classify::{GradeTone, RatioStatus, ScoreBand, Tone};

pub const ACCENT: Color = Color::Rgb(0, 255, 255);
pub const POSITIVE: Color = Color::Rgb(0, 255, 128);
pub const NEGATIVE: Color = Color::Rgb(255, 20, 147);
pub const WARNING: Color = Color::Rgb(255, 140, 0);
pub const NEUTRAL: Color = Color::Rgb(147, 112, 219);
pub const MUTED: Color = Color::Rgb(100, 149, 237);
pub const TEXT: Color = Color::White;
pub const TEXT_SECONDARY: Color = Color::Rgb(170, 170, 170);

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

pub fn accent_bold() -> Style {
    accent().add_modifier(Modifier::BOLD)
}

pub fn positive() -> Style {
    Style::default().fg(POSITIVE)
}

pub fn negative() -> Style {
    Style::default().fg(NEGATIVE)
}

pub fn warning() -> Style {
    Style::default().fg(WARNING)
}

pub fn neutral() -> Style {
    Style::default().fg(NEUTRAL)
}

pub fn muted() -> Style {
    Style::default().fg(MUTED)
}

pub fn text() -> Style {
    Style::default().fg(TEXT)
}

pub fn secondary() -> Style {
    Style::default().fg(TEXT_SECONDARY)
}

pub fn heading() -> Style {
    Style::default().fg(TEXT).add_modifier(Modifier::BOLD)
}

pub fn panel_border(active: bool) -> Style {
    if active {
        accent()
    } else {
        muted()
    }
}

pub fn panel_title(active: bool) -> Style {
    if active {
        accent_bold()
    } else {
        muted()
    }
}

pub fn tone(tone: Tone) -> Style {
    match tone {
        Tone::Positive => positive(),
        Tone::Negative => negative(),
        Tone::Neutral => neutral(),
    }
}

pub fn grade(tone: GradeTone) -> Style {
    match tone {
        GradeTone::Excellent => positive().add_modifier(Modifier::BOLD),
        GradeTone::Good => accent(),
        GradeTone::Average => neutral(),
        GradeTone::Poor => warning(),
        GradeTone::Failing => negative(),
        GradeTone::Unknown => secondary(),
    }
}

pub fn ratio(status: RatioStatus) -> Style {
    match status {
        RatioStatus::Safe => positive(),
        RatioStatus::Warning => warning(),
        RatioStatus::Danger => negative(),
        RatioStatus::NoData => secondary(),
    }
}

pub fn score_band(band: ScoreBand) -> Color {
    match band {
        ScoreBand::Green => POSITIVE,
        ScoreBand::Blue => ACCENT,
        ScoreBand::Amber => WARNING,
        ScoreBand::Red => NEGATIVE,
    }
}
