//! Base facts: everything rendered straight from the collected data.

use crate::classify::{signal_tone, trend_tone, Tone};
use crate::domain::{CollectedData, CompanyRef, SignalReading};
use crate::format::{
    format_change, format_date, format_price, format_with_unit, text_or_placeholder, PLACEHOLDER,
};

use super::ratios::{ratio_views, RatioView};
use super::statements::StatementsView;

/// News and disclosures shown on the page.
pub const LIST_LIMIT: usize = 5;

const DART_VIEWER_URL: &str = "https://dart.fss.or.kr/dsaf001/main.do?rcpNo=";

#[derive(Debug, Clone, PartialEq)]
pub struct BaseFactsView {
    pub company_name: String,
    pub price: PriceCard,
    pub valuation: ValuationRow,
    pub week52_range: String,
    pub rsi: IndicatorCard,
    pub mfi: IndicatorCard,
    pub moving_averages: MovingAverageCard,
    pub company_info: Vec<InfoRow>,
    pub news: Vec<NewsRow>,
    pub disclosures: Vec<DisclosureRow>,
    /// Viewer link for the most recent periodic report, if any.
    pub dart_link: Option<String>,
    pub ratios: Vec<RatioView>,
    pub statements: StatementsView,
    /// Sources the backend could not reach; shown as a footnote.
    pub data_warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceCard {
    pub current: String,
    pub change: String,
    pub change_tone: Tone,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValuationRow {
    pub per: String,
    pub pbr: String,
    pub eps: String,
    pub bps: String,
    pub div_yield: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorCard {
    pub value: String,
    pub signal: String,
    pub tone: Tone,
    /// Bar fill in percent, when a reading exists.
    pub bar_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MovingAverageCard {
    pub ma5: String,
    pub ma20: String,
    pub ma60: String,
    pub ma120: String,
    pub trend: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfoRow {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewsRow {
    pub title: String,
    pub source: String,
    pub date: String,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisclosureRow {
    pub date: String,
    pub title: String,
    pub url: Option<String>,
}

impl BaseFactsView {
    pub fn build(company: &CompanyRef, data: &CollectedData) -> Self {
        let krx = &data.krx;
        let change_rate = krx.current_price.change_rate.unwrap_or(0.0);

        let price = PriceCard {
            current: format_price(krx.current_price.close),
            change: format_change(change_rate),
            change_tone: if change_rate >= 0.0 { Tone::Positive } else { Tone::Negative },
        };

        let val = &krx.valuation;
        let valuation = ValuationRow {
            per: format_with_unit(val.per, "배"),
            pbr: format_with_unit(val.pbr, "배"),
            eps: format_price(val.eps),
            bps: format_price(val.bps),
            div_yield: format_with_unit(val.div_yield, "%"),
        };

        let yearly = &krx.yearly_trend;
        let week52_range = match (yearly.low_price, yearly.high_price) {
            (Some(lo), Some(hi)) if lo != 0.0 && hi != 0.0 => {
                format!("{} ~ {}", format_price(Some(lo)), format_price(Some(hi)))
            }
            _ => PLACEHOLDER.to_string(),
        };

        let ma = &krx.moving_averages;
        let moving_averages = MovingAverageCard {
            ma5: format_price(ma.current.ma5),
            ma20: format_price(ma.current.ma20),
            ma60: format_price(ma.current.ma60),
            ma120: format_price(ma.current.ma120),
            trend: text_or_placeholder(ma.trend.as_deref()),
            tone: trend_tone(ma.trend.as_deref()),
        };

        let disclosures: Vec<DisclosureRow> = data
            .dart
            .disclosures
            .iter()
            .take(LIST_LIMIT)
            .map(|d| DisclosureRow {
                date: format_date(d.rcept_dt.as_deref()),
                title: text_or_placeholder(d.report_nm.as_deref()),
                url: d.rcept_no.as_deref().map(dart_url),
            })
            .collect();

        let dart_link = data
            .dart
            .disclosures
            .iter()
            .find(|d| d.report_nm.as_deref().is_some_and(|n| n.contains("보고서")))
            .and_then(|d| d.rcept_no.as_deref())
            .map(dart_url);

        let news = data
            .news
            .items
            .iter()
            .take(LIST_LIMIT)
            .map(|n| NewsRow {
                title: text_or_placeholder(n.title.as_deref()),
                source: n.source.clone().unwrap_or_else(|| "뉴스".to_string()),
                date: format_date(n.pub_date.as_deref()),
                link: n.link.clone(),
            })
            .collect();

        Self {
            company_name: company.name.clone(),
            price,
            valuation,
            week52_range,
            rsi: indicator_card(&krx.rsi),
            mfi: indicator_card(&krx.mfi),
            moving_averages,
            company_info: company_info_rows(company, data),
            news,
            disclosures,
            dart_link,
            ratios: ratio_views(&data.dart.financial_index),
            statements: StatementsView::build(&data.dart.financials.key_accounts),
            data_warnings: data.errors.clone(),
        }
    }
}

fn indicator_card(reading: &SignalReading) -> IndicatorCard {
    IndicatorCard {
        value: reading
            .value
            .map(|v| format!("{v:.1}"))
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        signal: text_or_placeholder(reading.signal.as_deref()),
        tone: signal_tone(reading.signal.as_deref()),
        bar_pct: reading.value.map(|v| v.clamp(0.0, 100.0)),
    }
}

fn company_info_rows(company: &CompanyRef, data: &CollectedData) -> Vec<InfoRow> {
    let info = &data.dart.company_info;
    let corp_name = info
        .corp_name
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(&company.name);
    let fiscal_month = match info.acc_mt.as_deref().map(str::trim) {
        Some(m) if !m.is_empty() => format!("{m}월"),
        _ => PLACEHOLDER.to_string(),
    };

    vec![
        InfoRow { label: "회사명", value: corp_name.to_string() },
        InfoRow { label: "대표자", value: text_or_placeholder(info.ceo_nm.as_deref()) },
        InfoRow { label: "업종", value: text_or_placeholder(info.induty_code.as_deref()) },
        InfoRow { label: "설립일", value: format_date(info.est_dt.as_deref()) },
        InfoRow { label: "상장일", value: format_date(info.stock_lst_dt.as_deref()) },
        InfoRow { label: "결산월", value: fiscal_month },
        InfoRow { label: "홈페이지", value: text_or_placeholder(info.hm_url.as_deref()) },
    ]
}

fn dart_url(rcept_no: &str) -> String {
    format!("{DART_VIEWER_URL}{rcept_no}")
}
