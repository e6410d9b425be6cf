use super::document::{coerce_number, Document, Sample};
use super::schema::SchemaDefinition;
use super::scoring::percent;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// The fixed battery of integrity checks, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleId {
    TotalsBalance,
    LineMath,
    DateIso,
    CurrencyAllowed,
    TrnPresent,
}

impl RuleId {
    pub const ALL: [RuleId; 5] = [
        RuleId::TotalsBalance,
        RuleId::LineMath,
        RuleId::DateIso,
        RuleId::CurrencyAllowed,
        RuleId::TrnPresent,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            RuleId::TotalsBalance => "TOTALS_BALANCE",
            RuleId::LineMath => "LINE_MATH",
            RuleId::DateIso => "DATE_ISO",
            RuleId::CurrencyAllowed => "CURRENCY_ALLOWED",
            RuleId::TrnPresent => "TRN_PRESENT",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Evidence captured from the first offending document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RuleDetail {
    LineMath {
        /// 1-based position of the document holding the line.
        #[serde(rename = "exampleLine")]
        example_line: usize,
        expected: f64,
        got: f64,
    },
    Currency {
        value: String,
    },
}

impl RuleDetail {
    pub fn summary(&self) -> String {
        match self {
            RuleDetail::LineMath {
                example_line,
                expected,
                got,
            } => format!("Line {example_line}: expected {expected:.2}, got {got:.2}"),
            RuleDetail::Currency { value } => value.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleFinding {
    pub rule: RuleId,
    pub ok: bool,
    #[serde(flatten)]
    pub detail: Option<RuleDetail>,
}

impl RuleFinding {
    fn outcome(rule: RuleId, failure: Option<Option<RuleDetail>>) -> Self {
        match failure {
            None => Self {
                rule,
                ok: true,
                detail: None,
            },
            Some(detail) => Self {
                rule,
                ok: false,
                detail,
            },
        }
    }

    /// Human-readable gap line for failed rules.
    pub fn gap(&self) -> Option<String> {
        if self.ok {
            return None;
        }

        Some(match &self.detail {
            Some(detail) => format!("Rule Failed: {} ({})", self.rule, detail.summary()),
            None => format!("Rule Failed: {}", self.rule),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleReport {
    pub findings: Vec<RuleFinding>,
    pub score: u8,
}

impl RuleReport {
    pub fn passed(&self) -> usize {
        self.findings.iter().filter(|finding| finding.ok).count()
    }
}

/// Runs every rule over the whole sample. A rule fails when any document (or
/// line) violates it; only the first violation is described.
pub struct RuleEngine<'a> {
    schema: &'a SchemaDefinition,
    tolerance: f64,
}

impl<'a> RuleEngine<'a> {
    pub fn new(schema: &'a SchemaDefinition, tolerance: f64) -> Self {
        Self { schema, tolerance }
    }

    pub fn evaluate(&self, sample: &Sample) -> RuleReport {
        let findings: Vec<RuleFinding> = RuleId::ALL
            .into_iter()
            .map(|rule| RuleFinding::outcome(rule, self.first_violation(rule, sample)))
            .collect();

        let passed = findings.iter().filter(|finding| finding.ok).count();
        let score = percent(passed as f64, findings.len() as f64);

        RuleReport { findings, score }
    }

    /// `None` when the rule holds; otherwise the (optional) detail of the
    /// first offending document.
    fn first_violation(&self, rule: RuleId, sample: &Sample) -> Option<Option<RuleDetail>> {
        let mut documents = sample.documents().iter().enumerate();
        match rule {
            RuleId::TotalsBalance => documents
                .find(|(_, document)| !self.totals_balance(document))
                .map(|_| None),
            RuleId::LineMath => documents
                .find_map(|(index, document)| self.line_math(index, document))
                .map(Some),
            RuleId::DateIso => documents
                .find(|(_, document)| !date_is_iso(document))
                .map(|_| None),
            RuleId::CurrencyAllowed => documents
                .find_map(|(_, document)| self.disallowed_currency(document))
                .map(|value| Some(RuleDetail::Currency { value })),
            RuleId::TrnPresent => documents
                .find(|(_, document)| !trn_present(document))
                .map(|_| None),
        }
    }

    fn totals_balance(&self, document: &Document) -> bool {
        let excl = document.number("total_excl_vat");
        let vat = document.number("vat_amount");
        let incl = document.number("total_incl_vat");
        ((excl + vat) - incl).abs() <= self.tolerance
    }

    fn line_math(&self, index: usize, document: &Document) -> Option<RuleDetail> {
        document.lines().find_map(|line| {
            let qty = coerce_number(line.get("qty"));
            let price = coerce_number(line.get("unit_price"));
            let total = coerce_number(line.get("line_total"));
            let expected = qty * price;

            ((expected - total).abs() > self.tolerance).then(|| RuleDetail::LineMath {
                example_line: index + 1,
                expected: round_cents(expected),
                got: round_cents(total),
            })
        })
    }

    fn disallowed_currency(&self, document: &Document) -> Option<String> {
        let currency = document.text("currency")?.to_uppercase();
        (!self.schema.allows_currency(&currency)).then_some(currency)
    }
}

fn date_is_iso(document: &Document) -> bool {
    match document
        .text("date")
        .or_else(|| document.text("invoice_issue_date"))
    {
        Some(value) => is_iso_date(&value),
        None => true,
    }
}

/// `YYYY-MM-DD` with ASCII digits that also names a real calendar day.
pub fn is_iso_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(position, byte)| match position {
            4 | 7 => *byte == b'-',
            _ => byte.is_ascii_digit(),
        });

    shaped && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

fn trn_present(document: &Document) -> bool {
    let filled = |field: &str| {
        document
            .text(field)
            .is_some_and(|value| !value.trim().is_empty())
    };
    filled("buyer_trn") && filled("seller_trn")
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
