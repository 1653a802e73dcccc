//! CollectedData — KRX, DART and news facts from the collect-data endpoint.
//!
//! Only the fields the report renders are modelled; the rest stays in the
//! surrounding [`Payload`](super::Payload). Every field is optional because
//! the backend drops whole sections when an upstream source fails.

use serde::Deserialize;
use std::collections::BTreeMap;

use super::lenient;
use super::price::PricePoint;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectedData {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub krx: KrxData,
    #[serde(default)]
    pub dart: DartData,
    #[serde(default)]
    pub news: NewsData,
    /// Per-source collection failures the backend chose not to treat as fatal.
    #[serde(default)]
    pub errors: Vec<String>,
}

impl CollectedData {
    pub fn current_price(&self) -> Option<f64> {
        self.krx.current_price.close
    }

    pub fn price_history(&self) -> &[PricePoint] {
        &self.krx.price_history
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KrxData {
    #[serde(default)]
    pub current_price: CurrentPrice,
    #[serde(default)]
    pub valuation: Valuation,
    #[serde(default)]
    pub yearly_trend: YearlyTrend,
    #[serde(default)]
    pub rsi: SignalReading,
    #[serde(default)]
    pub mfi: SignalReading,
    #[serde(default)]
    pub moving_averages: MovingAverages,
    #[serde(default)]
    pub price_history: Vec<PricePoint>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrentPrice {
    #[serde(default, deserialize_with = "lenient::number")]
    pub close: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub change_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Valuation {
    #[serde(default, deserialize_with = "lenient::number")]
    pub per: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub pbr: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub eps: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub bps: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub div_yield: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct YearlyTrend {
    #[serde(default, deserialize_with = "lenient::number")]
    pub high_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub low_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_return: Option<f64>,
}

/// RSI / MFI style oscillator reading.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignalReading {
    #[serde(default, deserialize_with = "lenient::number")]
    pub value: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub signal: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovingAverages {
    #[serde(default)]
    pub current: MovingAverageSnapshot,
    #[serde(default, deserialize_with = "lenient::text")]
    pub trend: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovingAverageSnapshot {
    #[serde(default, deserialize_with = "lenient::number")]
    pub ma5: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub ma20: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub ma60: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub ma120: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DartData {
    #[serde(default)]
    pub company_info: CompanyInfo,
    /// Ratio categories ("수익성지표", "안정성지표", ...) to their items.
    #[serde(default)]
    pub financial_index: BTreeMap<String, Vec<FinancialIndexItem>>,
    #[serde(default)]
    pub financials: Financials,
    #[serde(default)]
    pub disclosures: Vec<Disclosure>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyInfo {
    #[serde(default, deserialize_with = "lenient::text")]
    pub corp_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub ceo_nm: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub induty_code: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub est_dt: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub stock_lst_dt: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub acc_mt: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub hm_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FinancialIndexItem {
    #[serde(default, deserialize_with = "lenient::text")]
    pub idx_nm: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub idx_val: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Financials {
    #[serde(default, rename = "type", deserialize_with = "lenient::text")]
    pub statement_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub year: Option<String>,
    #[serde(default)]
    pub key_accounts: BTreeMap<String, KeyAccount>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeyAccount {
    #[serde(default, deserialize_with = "lenient::number")]
    pub current: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub previous: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub change_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Disclosure {
    #[serde(default, deserialize_with = "lenient::text")]
    pub rcept_dt: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub report_nm: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub rcept_no: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewsData {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub items: Vec<NewsItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewsItem {
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub pub_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub source: Option<String>,
}
