//! Financial ratio cards looked up from the DART financial index.

use std::collections::BTreeMap;

use crate::classify::{RatioRule, RatioStatus};
use crate::domain::FinancialIndexItem;
use crate::format::{format_ratio, PLACEHOLDER};

const STABILITY: &str = "안정성지표";
const PROFITABILITY: &str = "수익성지표";
const ACTIVITY: &str = "활동성지표";

/// Where to find one ratio and how to judge it.
#[derive(Debug, Clone, Copy)]
pub struct RatioSpec {
    pub label: &'static str,
    pub category: &'static str,
    /// Index names are matched by substring, first hit wins.
    pub terms: &'static [&'static str],
    pub rule: RatioRule,
    pub unit: &'static str,
}

pub const FINANCIAL_RATIOS: [RatioSpec; 12] = [
    RatioSpec { label: "유동비율", category: STABILITY, terms: &["유동비율"], rule: RatioRule::higher(150.0, 200.0), unit: "%" },
    RatioSpec { label: "당좌비율", category: STABILITY, terms: &["당좌비율"], rule: RatioRule::higher(100.0, 150.0), unit: "%" },
    RatioSpec { label: "부채비율", category: STABILITY, terms: &["부채비율"], rule: RatioRule::lower(100.0, 200.0), unit: "%" },
    RatioSpec { label: "자기자본비율", category: STABILITY, terms: &["자기자본비율"], rule: RatioRule::higher(50.0, 70.0), unit: "%" },
    RatioSpec { label: "이자보상배율", category: STABILITY, terms: &["이자보상배율", "이자보상"], rule: RatioRule::higher(3.0, 5.0), unit: "배" },
    RatioSpec { label: "ROE", category: PROFITABILITY, terms: &["자기자본순이익률", "ROE"], rule: RatioRule::higher(10.0, 15.0), unit: "%" },
    RatioSpec { label: "ROA", category: PROFITABILITY, terms: &["총자산순이익률", "ROA"], rule: RatioRule::higher(5.0, 10.0), unit: "%" },
    RatioSpec { label: "순이익률", category: PROFITABILITY, terms: &["매출액순이익률", "순이익률"], rule: RatioRule::higher(5.0, 10.0), unit: "%" },
    RatioSpec { label: "영업이익률", category: PROFITABILITY, terms: &["매출액영업이익률", "영업이익률"], rule: RatioRule::higher(10.0, 15.0), unit: "%" },
    RatioSpec { label: "총자산회전율", category: ACTIVITY, terms: &["총자산회전율", "총자본회전율"], rule: RatioRule::higher(0.5, 1.0), unit: "회" },
    RatioSpec { label: "재고자산회전율", category: ACTIVITY, terms: &["재고자산회전율"], rule: RatioRule::higher(5.0, 10.0), unit: "회" },
    RatioSpec { label: "매출채권회전율", category: ACTIVITY, terms: &["매출채권회전율"], rule: RatioRule::higher(5.0, 10.0), unit: "회" },
];

#[derive(Debug, Clone, PartialEq)]
pub struct RatioView {
    pub label: &'static str,
    pub value: Option<f64>,
    pub display: String,
    pub status: RatioStatus,
}

pub fn find_ratio_value(
    index: &BTreeMap<String, Vec<FinancialIndexItem>>,
    category: &str,
    terms: &[&str],
) -> Option<f64> {
    let items = index.get(category)?;
    terms.iter().find_map(|term| {
        items
            .iter()
            .filter(|item| item.idx_nm.as_deref().is_some_and(|n| n.contains(term)))
            .find_map(|item| item.idx_val)
    })
}

pub fn ratio_views(index: &BTreeMap<String, Vec<FinancialIndexItem>>) -> Vec<RatioView> {
    FINANCIAL_RATIOS
        .iter()
        .map(|spec| {
            let value = find_ratio_value(index, spec.category, spec.terms);
            RatioView {
                label: spec.label,
                value,
                display: value
                    .map(|v| format_ratio(v, spec.unit))
                    .unwrap_or_else(|| PLACEHOLDER.to_string()),
                status: spec.rule.classify(value),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, value: Option<f64>) -> FinancialIndexItem {
        FinancialIndexItem {
            idx_nm: Some(name.to_string()),
            idx_val: value,
        }
    }

    #[test]
    fn substring_lookup_tries_terms_in_order() {
        let mut index = BTreeMap::new();
        index.insert(
            PROFITABILITY.to_string(),
            vec![item("ROE(%)", Some(9.1)), item("자기자본순이익률", None)],
        );
        // First term matches an item without a value, so the second term is used.
        assert_eq!(
            find_ratio_value(&index, PROFITABILITY, &["자기자본순이익률", "ROE"]),
            Some(9.1)
        );
        assert_eq!(find_ratio_value(&index, STABILITY, &["부채비율"]), None);
    }

    #[test]
    fn views_cover_every_ratio() {
        let mut index = BTreeMap::new();
        index.insert(STABILITY.to_string(), vec![item("부채비율", Some(250.0))]);
        let views = ratio_views(&index);
        assert_eq!(views.len(), FINANCIAL_RATIOS.len());

        let debt = views.iter().find(|v| v.label == "부채비율").unwrap();
        assert_eq!(debt.display, "250.00%");
        assert_eq!(debt.status, RatioStatus::Danger);

        let roe = views.iter().find(|v| v.label == "ROE").unwrap();
        assert_eq!(roe.display, "-");
        assert_eq!(roe.status, RatioStatus::NoData);
    }
}
