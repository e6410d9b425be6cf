use std::collections::HashSet;

use gets_readiness::analysis::{
    AnalysisContext, Document, Questionnaire, ReadinessAnalyzer, ReadinessReport, RuleDetail,
    RuleId, Sample, GETS_V0_1, MAX_ROWS,
};
use gets_readiness::ingest::{SampleImporter, SourceFormat};
use serde_json::{json, Value};

fn documents(values: Vec<Value>) -> Vec<Document> {
    values
        .into_iter()
        .map(|value| serde_json::from_value(value).expect("object document"))
        .collect()
}

fn analyze(values: Vec<Value>, questionnaire: &Questionnaire) -> ReadinessReport {
    let sample = Sample::bounded(documents(values), MAX_ROWS);
    ReadinessAnalyzer::default().analyze(
        &sample,
        sample.len(),
        questionnaire,
        &AnalysisContext::default(),
    )
}

fn rule_outcome(report: &ReadinessReport, rule: RuleId) -> (bool, Option<RuleDetail>) {
    let finding = report
        .rule_findings
        .iter()
        .find(|finding| finding.rule == rule)
        .expect("every rule reports a finding");
    (finding.ok, finding.detail.clone())
}

fn varied_samples() -> Vec<Vec<Value>> {
    vec![
        vec![],
        vec![json!({})],
        vec![json!({ "invoice_id": "1", "id": "2", "invoice": "3", "name": "x" })],
        vec![json!({
            "Invoice ID": "INV-9",
            "issue-date": "2024-01-31",
            "CURRENCY": "usd",
            "seller": "Acme",
            "buyer_trn": "",
            "lines": [{ "SKU": "A", "qty": "2", "price": "1" }]
        })],
        vec![
            json!({ "total_excl_vat": 100, "vat_amount": 5, "total_incl_vat": 106 }),
            json!({ "date": "01/31/2024", "currency": "gbp" }),
        ],
    ]
}

#[test]
fn fixture_csv_scores_end_to_end() {
    let data = include_bytes!("../sample_invoices.csv");
    let imported = SampleImporter::default()
        .from_reader(&data[..], SourceFormat::Csv)
        .expect("fixture imports");
    assert_eq!(imported.rows_parsed, 4);

    let questionnaire = Questionnaire {
        webhooks: true,
        sandbox_env: true,
        retries: true,
    };
    let report = ReadinessAnalyzer::default().analyze(
        &imported.sample,
        imported.rows_parsed,
        &questionnaire,
        &AnalysisContext::new(Some("AE".to_string()), None),
    );

    assert_eq!(
        report.coverage.matched,
        vec!["invoice.id", "seller.name", "seller.trn", "buyer.name", "buyer.trn"]
    );
    let close: Vec<(&str, &str)> = report
        .coverage
        .close
        .iter()
        .map(|close| (close.target.as_str(), close.candidate.as_str()))
        .collect();
    assert_eq!(
        close,
        vec![
            ("invoice.issue_date", "date"),
            ("invoice.currency", "currency"),
            ("invoice.total_excl_vat", "total_excl_vat"),
            ("invoice.vat_amount", "vat_amount"),
            ("invoice.total_incl_vat", "total_incl_vat"),
        ]
    );
    assert_eq!(report.coverage.missing.len(), 6);

    assert_eq!(report.scores.data, 2);
    assert_eq!(report.scores.coverage, 56);
    assert_eq!(report.scores.rules, 100);
    assert_eq!(report.scores.posture, 100);
    assert_eq!(report.scores.overall, 60);
    assert!(report.gaps.is_empty());
    assert_eq!(report.meta.country, "AE");
    assert_eq!(report.meta.erp, "N/A");
    assert_eq!(report.meta.lines_total, 0);
}

#[test]
fn every_required_path_lands_in_exactly_one_bucket() {
    for values in varied_samples() {
        let report = analyze(values, &Questionnaire::default());
        let coverage = &report.coverage;
        assert_eq!(coverage.total(), GETS_V0_1.required_count());

        let mut seen = HashSet::new();
        let targets = coverage
            .matched
            .iter()
            .map(String::as_str)
            .chain(coverage.close.iter().map(|close| close.target.as_str()))
            .chain(coverage.missing.iter().map(String::as_str));
        for target in targets {
            assert!(seen.insert(target), "{target} reported twice");
        }
        assert_eq!(seen.len(), GETS_V0_1.required_count());
        assert!(report.scores.coverage <= 100);
    }
}

#[test]
fn one_source_key_backs_at_most_one_exact_match() {
    // "invoice.id" and "lines[].sku" only match exactly once each even though
    // both documents carry the same keys.
    let report = analyze(
        vec![
            json!({ "invoice.id": "1", "lines": [{ "sku": "A" }] }),
            json!({ "invoice.id": "2", "lines": [{ "sku": "B" }] }),
        ],
        &Questionnaire::default(),
    );

    assert_eq!(report.coverage.matched, vec!["invoice.id", "lines[].sku"]);
}

#[test]
fn close_matches_weigh_in_as_one_product() {
    // 2 exact + 8 close over 16 paths lands exactly on 52.5 before rounding.
    let report = analyze(
        vec![json!({
            "invoice.id": "INV-1",
            "invoice.issue_date": "2024-01-31",
            "currency": "AED",
            "total_excl_vat": 100,
            "vat_amount": 5,
            "total_incl_vat": 105,
            "name": "Acme",
            "trn": "100"
        })],
        &Questionnaire::default(),
    );

    assert_eq!(report.coverage.matched.len(), 2);
    assert_eq!(report.coverage.close.len(), 8);
    assert_eq!(report.coverage.missing.len(), 6);
    assert_eq!(report.scores.coverage, 53);
}

#[test]
fn rule_score_moves_in_steps_of_twenty() {
    for values in varied_samples() {
        let report = analyze(values, &Questionnaire::default());
        assert_eq!(report.scores.rules % 20, 0);
        assert_eq!(report.rule_findings.len(), RuleId::ALL.len());
        assert!(report.scores.overall <= 100);
    }
}

#[test]
fn totals_balance_examples() {
    let balanced = analyze(
        vec![json!({ "total_excl_vat": 100, "vat_amount": 5, "total_incl_vat": "105.00" })],
        &Questionnaire::default(),
    );
    assert!(rule_outcome(&balanced, RuleId::TotalsBalance).0);

    let unbalanced = analyze(
        vec![json!({ "total_excl_vat": 100, "vat_amount": 5, "total_incl_vat": 106 })],
        &Questionnaire::default(),
    );
    assert_eq!(
        rule_outcome(&unbalanced, RuleId::TotalsBalance),
        (false, None)
    );
    assert_eq!(unbalanced.gaps, vec!["Rule Failed: TOTALS_BALANCE"]);
}

#[test]
fn line_math_examples() {
    let line = |total: f64| {
        json!({ "lines": [{ "qty": 2, "unit_price": 10.5, "line_total": total }] })
    };

    let passing = analyze(vec![line(21.0)], &Questionnaire::default());
    assert!(rule_outcome(&passing, RuleId::LineMath).0);

    let failing = analyze(vec![line(21.0), line(25.0)], &Questionnaire::default());
    assert_eq!(
        rule_outcome(&failing, RuleId::LineMath),
        (
            false,
            Some(RuleDetail::LineMath {
                example_line: 2,
                expected: 21.0,
                got: 25.0,
            })
        )
    );
}

#[test]
fn date_examples() {
    for (date, ok) in [
        ("2024-13-40", false),
        ("01/31/2024", false),
        ("2024-01-31", true),
    ] {
        let report = analyze(vec![json!({ "date": date })], &Questionnaire::default());
        assert_eq!(rule_outcome(&report, RuleId::DateIso).0, ok, "{date}");
    }

    let absent = analyze(vec![json!({ "invoice_id": "1" })], &Questionnaire::default());
    assert!(rule_outcome(&absent, RuleId::DateIso).0);
}

#[test]
fn currency_examples() {
    let disallowed = analyze(vec![json!({ "currency": "eur" })], &Questionnaire::default());
    assert_eq!(
        rule_outcome(&disallowed, RuleId::CurrencyAllowed),
        (
            false,
            Some(RuleDetail::Currency {
                value: "EUR".to_string()
            })
        )
    );

    let allowed = analyze(vec![json!({ "currency": "usd" })], &Questionnaire::default());
    assert!(rule_outcome(&allowed, RuleId::CurrencyAllowed).0);
}

#[test]
fn posture_counts_yes_answers() {
    let report = analyze(
        vec![json!({})],
        &Questionnaire {
            webhooks: true,
            sandbox_env: true,
            retries: false,
        },
    );
    assert_eq!(report.scores.posture, 67);
}

#[test]
fn data_score_tracks_rows_parsed() {
    let empty = analyze(vec![], &Questionnaire::default());
    assert_eq!(empty.scores.data, 0);

    let full = analyze(
        (0..MAX_ROWS).map(|index| json!({ "id": index })).collect(),
        &Questionnaire::default(),
    );
    assert_eq!(full.scores.data, 100);
    assert_eq!(full.meta.rows_parsed, MAX_ROWS);
}

#[test]
fn analysis_is_deterministic() {
    let sample = varied_samples().pop().expect("sample");
    let questionnaire = Questionnaire {
        webhooks: true,
        sandbox_env: false,
        retries: true,
    };

    let first = analyze(sample.clone(), &questionnaire);
    let second = analyze(sample, &questionnaire);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).expect("serializes"),
        serde_json::to_string(&second).expect("serializes")
    );
}
