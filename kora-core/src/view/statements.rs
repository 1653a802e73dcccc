//! Balance sheet, income statement and cash-flow rows (amounts in 억).

use std::collections::BTreeMap;

use crate::classify::Tone;
use crate::domain::KeyAccount;
use crate::format::format_eok;

#[derive(Debug, Clone, PartialEq)]
pub struct StatementRow {
    pub label: String,
    pub amount: String,
    pub note: String,
    pub highlight: bool,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatementsView {
    pub balance_sheet: Vec<StatementRow>,
    pub income_statement: Vec<StatementRow>,
    pub cash_flow: Vec<StatementRow>,
}

const BALANCE_SHEET: [(&str, bool, u8); 7] = [
    ("자산총계", true, 0),
    ("유동자산", false, 1),
    ("비유동자산", false, 1),
    ("부채총계", true, 0),
    ("유동부채", false, 1),
    ("비유동부채", false, 1),
    ("자본총계", true, 0),
];

const INCOME_STATEMENT: [(&str, bool); 5] = [
    ("매출액", true),
    ("매출원가", false),
    ("매출총이익", false),
    ("영업이익", true),
    ("당기순이익", true),
];

const CASH_FLOW: [(&str, bool); 3] = [
    ("영업활동현금흐름", true),
    ("투자활동현금흐름", false),
    ("재무활동현금흐름", false),
];

const OPERATING_CASH_FLOW: &str = "영업활동현금흐름";

impl StatementsView {
    pub fn build(accounts: &BTreeMap<String, KeyAccount>) -> Self {
        let empty = KeyAccount::default();
        let account = |key: &str| accounts.get(key).unwrap_or(&empty);

        let balance_sheet = BALANCE_SHEET
            .iter()
            .map(|&(key, highlight, indent)| {
                let acc = account(key);
                StatementRow {
                    label: format!("{}{key}", "  ".repeat(indent as usize)),
                    amount: format_eok(acc.current),
                    note: change_note(acc),
                    highlight,
                    tone: Tone::Neutral,
                }
            })
            .collect();

        let income_statement = INCOME_STATEMENT
            .iter()
            .map(|&(key, highlight)| {
                let acc = account(key);
                let tone = if key.contains("이익") {
                    acc.current.map(Tone::of_sign).unwrap_or(Tone::Neutral)
                } else {
                    Tone::Neutral
                };
                StatementRow {
                    label: key.to_string(),
                    amount: format_eok(acc.current),
                    note: change_note(acc),
                    highlight,
                    tone,
                }
            })
            .collect();

        let cash_flow = CASH_FLOW
            .iter()
            .map(|&(key, highlight)| {
                let acc = account(key);
                let tone = acc.current.map(Tone::of_sign).unwrap_or(Tone::Neutral);
                let note = match (key, tone) {
                    (OPERATING_CASH_FLOW, Tone::Positive) => "양호".to_string(),
                    (OPERATING_CASH_FLOW, Tone::Negative) => "주의".to_string(),
                    _ => String::new(),
                };
                StatementRow {
                    label: key.to_string(),
                    amount: format_eok(acc.current),
                    note,
                    highlight,
                    tone,
                }
            })
            .collect();

        Self {
            balance_sheet,
            income_statement,
            cash_flow,
        }
    }
}

fn change_note(acc: &KeyAccount) -> String {
    match acc.change_rate {
        Some(rate) if rate != 0.0 => format!("전기 대비 {rate}%"),
        _ => String::new(),
    }
}
