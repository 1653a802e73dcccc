//! Report body — sections in page order, each drawn once it is revealed.
//!
//! Base facts appear as soon as they arrive; AI sections show placeholders
//! until the analysis lands (or stay that way when it was skipped).

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use kora_core::classify::{GradeTone, Tone};
use kora_core::format::PLACEHOLDER;
use kora_core::view::analysis::{OPINION_PENDING, SUMMARY_UNAVAILABLE};
use kora_core::view::{AnalysisView, BaseFactsView, Section, StatementRow};

use crate::app::{AppState, ReportState};
use crate::theme;
use crate::ui::chart_panel;

const CHART_HEIGHT: u16 = 14;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let report = &app.report;
    let show_chart = report.revealed.contains(&Section::PriceChart);

    let text_area = if show_chart {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(CHART_HEIGHT), Constraint::Min(3)])
            .split(area);
        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(theme::muted())
            .title(format!(" {} [{}] (c: 전환) ", Section::PriceChart.title(), report.chart_mode))
            .title_style(theme::heading());
        let inner = block.inner(rows[0]);
        f.render_widget(block, rows[0]);
        chart_panel::render(f, inner, report.chart.as_ref(), report.chart_mode);
        rows[1]
    } else {
        area
    };

    let lines = report_lines(report, app.credits);
    let para = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((report.scroll, 0));
    f.render_widget(para, text_area);
}

/// All text lines for the revealed sections, in page order.
pub fn report_lines(report: &ReportState, credits: Option<f64>) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if let Some(remaining) = credits {
        lines.push(Line::from(Span::styled(
            format!("잔여 크레딧: {remaining:.0}"),
            theme::muted(),
        )));
    }

    let Some(base) = &report.base else {
        if report.revealed.is_empty() {
            lines.push(Line::from(Span::styled("데이터를 불러오는 중...", theme::muted())));
        }
        return lines;
    };

    price_header(&mut lines, base);

    for section in Section::ALL {
        if section == Section::PriceChart || !report.revealed.contains(&section) {
            continue;
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("■ {}", section.title()),
            theme::accent_bold(),
        )));
        match section {
            Section::Summary => summary(&mut lines, report.analysis.as_ref(), report.analysis_note.as_deref()),
            Section::Technical => technical(&mut lines, base),
            Section::Financials => financials(&mut lines, base),
            Section::DetailEvaluation => details(&mut lines, report.analysis.as_ref()),
            Section::Forecast => forecast(&mut lines, report.analysis.as_ref()),
            Section::RequestAnswer => {
                let text = if report.answer_pending {
                    "답변 생성 중...".to_string()
                } else {
                    report.answer.clone().unwrap_or_else(|| PLACEHOLDER.to_string())
                };
                lines.push(Line::from(Span::styled(text, theme::text())));
            }
            Section::News => news(&mut lines, base),
            Section::CompanyInfo => {
                for row in &base.company_info {
                    lines.push(kv(row.label, row.value.clone()));
                }
            }
            Section::PriceChart => {}
        }
    }

    if report.export_enabled {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "[p] 보고서 내보내기 (Markdown)",
            theme::muted(),
        )));
    }
    lines
}

fn kv(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {label:<10} "), theme::secondary()),
        Span::styled(value, theme::text()),
    ])
}

fn price_header(lines: &mut Vec<Line<'static>>, base: &BaseFactsView) {
    lines.push(Line::from(vec![
        Span::styled(base.company_name.clone(), theme::heading()),
        Span::raw("  "),
        Span::styled(base.price.current.clone(), theme::text().add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        Span::styled(base.price.change.clone(), theme::tone(base.price.change_tone)),
    ]));
    let v = &base.valuation;
    lines.push(Line::from(Span::styled(
        format!(
            "PER {}  PBR {}  EPS {}  BPS {}  배당 {}  52주 {}",
            v.per, v.pbr, v.eps, v.bps, v.div_yield, base.week52_range
        ),
        theme::secondary(),
    )));
}

fn summary(lines: &mut Vec<Line<'static>>, analysis: Option<&AnalysisView>, note: Option<&str>) {
    let Some(a) = analysis else {
        let text = match note {
            Some(_) => SUMMARY_UNAVAILABLE,
            None => OPINION_PENDING,
        };
        lines.push(Line::from(Span::styled(text, theme::muted())));
        return;
    };

    lines.push(Line::from(vec![
        Span::styled("  적정주가   ", theme::secondary()),
        Span::styled(a.fair_price.clone(), theme::text().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(a.valuation.label(), theme::tone(valuation_tone(a))),
    ]));
    lines.push(Line::from(vec![
        Span::styled("  투자 점수  ", theme::secondary()),
        Span::styled(
            format!("{} / 100", a.score_text),
            ratatui::style::Style::default().fg(theme::score_band(a.gauge.band)),
        ),
        Span::raw("  "),
        Span::styled(format!("등급 {}", a.grade), theme::grade(GradeTone::of(&a.grade))),
    ]));
    let mut opinion = vec![
        Span::styled("  투자 의견  ", theme::secondary()),
        Span::styled(a.opinion.clone(), theme::accent_bold()),
    ];
    if !a.opinion_sub.is_empty() {
        opinion.push(Span::styled(format!("  {}", a.opinion_sub), theme::muted()));
    }
    lines.push(Line::from(opinion));
    lines.push(kv("뉴스 감성", format!("{} ({})", a.news_sentiment, a.news_score)));

    for bar in &a.breakdown {
        let width = bar.width_pct.unwrap_or(0.0).clamp(0.0, 100.0);
        let filled = (width / 5.0).round() as usize;
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<8} ", bar.label), theme::secondary()),
            Span::styled("█".repeat(filled), theme::grade(bar.grade_tone)),
            Span::styled("░".repeat(20 - filled.min(20)), theme::muted()),
            Span::styled(
                format!(" {}", bar.grade.as_deref().unwrap_or(PLACEHOLDER)),
                theme::grade(bar.grade_tone),
            ),
        ]));
    }
    lines.push(Line::from(Span::styled(a.evaluation_summary.clone(), theme::text())));
    if let Some(summary) = &a.business_summary {
        lines.push(Line::from(Span::styled(summary.clone(), theme::secondary())));
    }
}

fn valuation_tone(a: &AnalysisView) -> Tone {
    match a.valuation {
        kora_core::classify::ValuationBadge::Undervalued { .. } => Tone::Positive,
        kora_core::classify::ValuationBadge::Overvalued { .. } => Tone::Negative,
        kora_core::classify::ValuationBadge::Fair => Tone::Neutral,
    }
}

fn technical(lines: &mut Vec<Line<'static>>, base: &BaseFactsView) {
    for (name, card) in [("RSI", &base.rsi), ("MFI", &base.mfi)] {
        lines.push(Line::from(vec![
            Span::styled(format!("  {name:<10} "), theme::secondary()),
            Span::styled(card.value.clone(), theme::text()),
            Span::raw("  "),
            Span::styled(card.signal.clone(), theme::tone(card.tone)),
        ]));
    }
    let ma = &base.moving_averages;
    lines.push(kv("5일선", ma.ma5.clone()));
    lines.push(kv("20일선", ma.ma20.clone()));
    lines.push(kv("60일선", ma.ma60.clone()));
    lines.push(kv("120일선", ma.ma120.clone()));
    lines.push(Line::from(vec![
        Span::styled(format!("  {:<10} ", "추세"), theme::secondary()),
        Span::styled(ma.trend.clone(), theme::tone(ma.tone)),
    ]));
}

fn financials(lines: &mut Vec<Line<'static>>, base: &BaseFactsView) {
    for r in &base.ratios {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<10} ", r.label), theme::secondary()),
            Span::styled(format!("{:>10} ", r.display), theme::text()),
            Span::styled(r.status.label(), theme::ratio(r.status)),
        ]));
    }
    let s = &base.statements;
    for (title, rows) in [
        ("재무상태표", &s.balance_sheet),
        ("손익계산서", &s.income_statement),
        ("현금흐름표", &s.cash_flow),
    ] {
        if rows.is_empty() {
            continue;
        }
        lines.push(Line::from(Span::styled(format!("  {title} (억원)"), theme::heading())));
        for row in rows.iter() {
            lines.push(statement_line(row));
        }
    }
}

fn statement_line(row: &StatementRow) -> Line<'static> {
    let label_style = if row.highlight { theme::heading() } else { theme::secondary() };
    Line::from(vec![
        Span::styled(format!("    {:<16}", row.label), label_style),
        Span::styled(format!("{:>14} ", row.amount), theme::tone(row.tone)),
        Span::styled(row.note.clone(), theme::muted()),
    ])
}

fn details(lines: &mut Vec<Line<'static>>, analysis: Option<&AnalysisView>) {
    let Some(a) = analysis else {
        lines.push(Line::from(Span::styled(OPINION_PENDING, theme::muted())));
        return;
    };
    for (key, body) in a.detail_lines() {
        if !key.is_empty() {
            lines.push(Line::from(Span::styled(format!("  ▸ {key}"), theme::accent())));
        }
        lines.push(Line::from(Span::styled(format!("    {body}"), theme::text())));
    }
}

fn forecast(lines: &mut Vec<Line<'static>>, analysis: Option<&AnalysisView>) {
    let Some(a) = analysis else {
        lines.push(Line::from(Span::styled(OPINION_PENDING, theme::muted())));
        return;
    };
    let f = &a.forecast;
    lines.push(kv("3개월", f.three_month.clone()));
    lines.push(kv("6개월", f.six_month.clone()));
    lines.push(kv("12개월", f.twelve_month.clone()));
    if let Some(confidence) = &f.confidence {
        lines.push(kv("신뢰도", confidence.clone()));
    }
    if let Some(disclaimer) = &f.disclaimer {
        lines.push(Line::from(Span::styled(format!("  ⚠ {disclaimer}"), theme::warning())));
    }
}

fn news(lines: &mut Vec<Line<'static>>, base: &BaseFactsView) {
    for n in &base.news {
        lines.push(Line::from(vec![
            Span::styled("  • ", theme::muted()),
            Span::styled(n.title.clone(), theme::text()),
            Span::styled(format!("  {} · {}", n.source, n.date), theme::muted()),
        ]));
    }
    for d in &base.disclosures {
        lines.push(Line::from(vec![
            Span::styled(format!("  {} ", d.date), theme::muted()),
            Span::styled(d.title.clone(), theme::secondary()),
        ]));
    }
    if let Some(link) = &base.dart_link {
        lines.push(Line::from(Span::styled(format!("  DART: {link}"), theme::accent())));
    }
}
