//! Markdown export of a finished report.
//!
//! Transient chrome (loading overlay, chat sidebar) is hidden while the report
//! is captured and put back exactly as it was afterwards, including when the
//! capture fails.

use crate::pipeline::ReportPipeline;
use chrono::{NaiveDate, NaiveDateTime};
use kora_core::view::{
    AnalysisView, BaseFactsView, ChartView, SeriesKind, StatementRow, StatementsView,
};
use kora_core::format::{format_price, PLACEHOLDER};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no report data to export yet")]
    NothingToExport,

    #[error("write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// UI elements that must not appear in an export.
pub trait ExportChrome {
    fn overlay_visible(&self) -> bool;
    fn set_overlay_visible(&mut self, visible: bool);
    fn sidebar_visible(&self) -> bool;
    fn set_sidebar_visible(&mut self, visible: bool);
}

/// Hide overlay and sidebar, run `capture`, then restore both.
pub fn with_chrome_hidden<C, T, E>(chrome: &mut C, capture: impl FnOnce() -> Result<T, E>) -> Result<T, E>
where
    C: ExportChrome + ?Sized,
{
    let overlay = chrome.overlay_visible();
    let sidebar = chrome.sidebar_visible();
    chrome.set_overlay_visible(false);
    chrome.set_sidebar_visible(false);

    let result = capture();

    chrome.set_overlay_visible(overlay);
    chrome.set_sidebar_visible(sidebar);
    result
}

/// `KORA_AI_<company>_report_<YYYYMMDD>.md`
pub fn export_file_name(company: &str, date: NaiveDate) -> String {
    let safe: String = company
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect();
    format!("KORA_AI_{safe}_report_{}.md", date.format("%Y%m%d"))
}

/// Write the markdown report into `dir` and return its path.
pub fn write_report(
    dir: &Path,
    pipeline: &ReportPipeline,
    generated: NaiveDateTime,
) -> Result<PathBuf, ExportError> {
    let markdown = MarkdownReport::from_pipeline(pipeline, generated)
        .ok_or(ExportError::NothingToExport)?
        .render();
    let base = pipeline
        .company()
        .map(|c| c.name.as_str())
        .unwrap_or("report");
    let path = dir.join(export_file_name(base, generated.date()));
    std::fs::write(&path, markdown).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    info!(path = %path.display(), "report exported");
    Ok(path)
}

/// Snapshot of everything an export shows.
pub struct MarkdownReport<'a> {
    pub company: &'a str,
    pub ticker: &'a str,
    pub generated: NaiveDateTime,
    pub base: BaseFactsView,
    pub analysis: Option<AnalysisView>,
    pub chart: Option<&'a ChartView>,
    pub answer: Option<&'a str>,
}

impl<'a> MarkdownReport<'a> {
    pub fn from_pipeline(pipeline: &'a ReportPipeline, generated: NaiveDateTime) -> Option<Self> {
        let company = pipeline.company()?;
        Some(Self {
            company: &company.name,
            ticker: &company.ticker,
            generated,
            base: pipeline.base_facts()?,
            analysis: pipeline.analysis_view(),
            chart: pipeline.chart().current().map(|c| c.view()),
            answer: pipeline.answer(),
        })
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# {} ({}) AI 투자 분석 보고서\n", self.company, self.ticker);
        let _ = writeln!(out, "생성: {}\n", self.generated.format("%Y-%m-%d %H:%M"));

        self.summary(&mut out);
        self.price(&mut out);
        self.technical(&mut out);
        self.financials(&mut out);
        self.details(&mut out);
        self.forecast(&mut out);
        if let Some(answer) = self.answer {
            let _ = writeln!(out, "## 요청 답변\n\n{answer}\n");
        }
        self.news(&mut out);
        self.company_info(&mut out);

        if !self.base.data_warnings.is_empty() {
            out.push_str("---\n\n수집되지 않은 데이터:\n");
            for w in &self.base.data_warnings {
                let _ = writeln!(out, "- {w}");
            }
        }
        out
    }

    fn summary(&self, out: &mut String) {
        out.push_str("## 투자 요약\n\n");
        match &self.analysis {
            Some(a) => {
                let _ = writeln!(out, "- 적정주가: {} ({})", a.fair_price, a.valuation.label());
                let _ = writeln!(out, "- 투자 점수: {} / 100 (등급 {})", a.score_text, a.grade);
                if a.opinion_sub.is_empty() {
                    let _ = writeln!(out, "- 투자 의견: {}", a.opinion);
                } else {
                    let _ = writeln!(out, "- 투자 의견: {} ({})", a.opinion, a.opinion_sub);
                }
                let _ = writeln!(out, "- 뉴스 감성: {} ({})\n", a.news_sentiment, a.news_score);
                let _ = writeln!(out, "{}\n", a.evaluation_summary);

                out.push_str("| 항목 | 점수 | 등급 |\n|------|------|------|\n");
                for bar in &a.breakdown {
                    let _ = writeln!(
                        out,
                        "| {} | {} | {} |",
                        bar.label,
                        bar.width_pct
                            .map(|w| format!("{w:.0}"))
                            .unwrap_or_else(|| PLACEHOLDER.to_string()),
                        bar.grade.as_deref().unwrap_or(PLACEHOLDER)
                    );
                }
                out.push('\n');
                if let Some(summary) = &a.business_summary {
                    let _ = writeln!(out, "### 사업 개요\n\n{summary}\n");
                }
            }
            None => out.push_str("AI 분석을 완료하지 못했습니다.\n\n"),
        }
    }

    fn price(&self, out: &mut String) {
        let b = &self.base;
        let v = &b.valuation;
        out.push_str("## 주가\n\n");
        let _ = writeln!(out, "- 현재가: {} ({})", b.price.current, b.price.change);
        let _ = writeln!(out, "- 52주 범위: {}\n", b.week52_range);
        out.push_str("| PER | PBR | EPS | BPS | 배당수익률 |\n|-----|-----|-----|-----|------------|\n");
        let _ = writeln!(out, "| {} | {} | {} | {} | {} |\n", v.per, v.pbr, v.eps, v.bps, v.div_yield);

        if let Some(chart) = self.chart {
            let _ = writeln!(out, "차트 ({}): {} 구간", chart.mode, chart.len());
            for series in &chart.series {
                let last = series.values.iter().rev().flatten().next().copied();
                let label = match series.kind {
                    SeriesKind::Forecast => "마지막 예측",
                    _ => "마지막 값",
                };
                let _ = writeln!(out, "- {}: {} {}", series.label, label, format_price(last));
            }
            out.push('\n');
        }
    }

    fn technical(&self, out: &mut String) {
        let b = &self.base;
        let ma = &b.moving_averages;
        out.push_str("## 기술적 지표\n\n");
        let _ = writeln!(out, "- RSI: {} ({})", b.rsi.value, b.rsi.signal);
        let _ = writeln!(out, "- MFI: {} ({})", b.mfi.value, b.mfi.signal);
        let _ = writeln!(
            out,
            "- 이동평균: 5일 {} / 20일 {} / 60일 {} / 120일 {} ({})\n",
            ma.ma5, ma.ma20, ma.ma60, ma.ma120, ma.trend
        );
    }

    fn financials(&self, out: &mut String) {
        out.push_str("## 재무 분석\n\n| 지표 | 값 | 상태 |\n|------|----|------|\n");
        for r in &self.base.ratios {
            let _ = writeln!(out, "| {} | {} | {} |", r.label, r.display, r.status.label());
        }
        out.push('\n');

        let StatementsView {
            balance_sheet,
            income_statement,
            cash_flow,
        } = &self.base.statements;
        statement_table(out, "재무상태표", balance_sheet);
        statement_table(out, "손익계산서", income_statement);
        statement_table(out, "현금흐름표", cash_flow);
    }

    fn details(&self, out: &mut String) {
        let Some(a) = &self.analysis else {
            return;
        };
        out.push_str("## 상세 평가\n\n");
        for (key, body) in a.detail_lines() {
            if key.is_empty() {
                let _ = writeln!(out, "{body}\n");
            } else {
                let _ = writeln!(out, "### {key}\n\n{body}\n");
            }
        }
    }

    fn forecast(&self, out: &mut String) {
        let Some(a) = &self.analysis else {
            return;
        };
        let f = &a.forecast;
        out.push_str("## 주가 전망\n\n| 3개월 | 6개월 | 12개월 |\n|-------|-------|--------|\n");
        let _ = writeln!(out, "| {} | {} | {} |\n", f.three_month, f.six_month, f.twelve_month);
        if let Some(confidence) = &f.confidence {
            let _ = writeln!(out, "신뢰도: {confidence}\n");
        }
        if let Some(disclaimer) = &f.disclaimer {
            let _ = writeln!(out, "> ⚠️ {disclaimer}\n");
        }
    }

    fn news(&self, out: &mut String) {
        let b = &self.base;
        out.push_str("## 뉴스 & 공시\n\n");
        for n in &b.news {
            match &n.link {
                Some(link) => {
                    let _ = writeln!(out, "- [{}]({}) · {} · {}", n.title, link, n.source, n.date);
                }
                None => {
                    let _ = writeln!(out, "- {} · {} · {}", n.title, n.source, n.date);
                }
            }
        }
        if !b.disclosures.is_empty() {
            out.push('\n');
        }
        for d in &b.disclosures {
            let _ = writeln!(out, "- {} {}", d.date, d.title);
        }
        if let Some(link) = &b.dart_link {
            let _ = writeln!(out, "\n[DART 공시 원문]({link})");
        }
        out.push('\n');
    }

    fn company_info(&self, out: &mut String) {
        out.push_str("## 기업 정보\n\n| 항목 | 내용 |\n|------|------|\n");
        for row in &self.base.company_info {
            let _ = writeln!(out, "| {} | {} |", row.label, row.value);
        }
        out.push('\n');
    }
}

fn statement_table(out: &mut String, title: &str, rows: &[StatementRow]) {
    let _ = writeln!(out, "### {title} (억원)\n");
    out.push_str("| 계정 | 금액 | 비고 |\n|------|------|------|\n");
    for row in rows {
        let label = if row.highlight {
            format!("**{}**", row.label.trim())
        } else {
            row.label.trim().to_string()
        };
        let _ = writeln!(out, "| {} | {} | {} |", label, row.amount, row.note);
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Chrome {
        overlay: Rc<Cell<bool>>,
        sidebar: Rc<Cell<bool>>,
    }

    impl Chrome {
        fn new(overlay: bool, sidebar: bool) -> Self {
            Self {
                overlay: Rc::new(Cell::new(overlay)),
                sidebar: Rc::new(Cell::new(sidebar)),
            }
        }
    }

    impl ExportChrome for Chrome {
        fn overlay_visible(&self) -> bool {
            self.overlay.get()
        }
        fn set_overlay_visible(&mut self, visible: bool) {
            self.overlay.set(visible);
        }
        fn sidebar_visible(&self) -> bool {
            self.sidebar.get()
        }
        fn set_sidebar_visible(&mut self, visible: bool) {
            self.sidebar.set(visible);
        }
    }

    #[test]
    fn file_name_uses_company_and_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(export_file_name("삼성전자", date), "KORA_AI_삼성전자_report_20240305.md");
        assert_eq!(export_file_name("A/B Corp", date), "KORA_AI_A_B_Corp_report_20240305.md");
    }

    #[test]
    fn chrome_is_restored_after_failure() {
        let mut chrome = Chrome::new(false, true);
        let result: Result<(), &str> = with_chrome_hidden(&mut chrome, || Err("disk full"));
        assert!(result.is_err());
        assert!(!chrome.overlay_visible());
        assert!(chrome.sidebar_visible());
    }

    #[test]
    fn chrome_is_hidden_while_capturing() {
        let mut chrome = Chrome::new(true, true);
        let overlay = Rc::clone(&chrome.overlay);
        let sidebar = Rc::clone(&chrome.sidebar);
        let result: Result<(bool, bool), ()> =
            with_chrome_hidden(&mut chrome, || Ok((overlay.get(), sidebar.get())));
        assert_eq!(result, Ok((false, false)));
        assert!(chrome.overlay_visible());
        assert!(chrome.sidebar_visible());
    }
}
