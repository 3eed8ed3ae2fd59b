use chrono::NaiveDate;
use macroscope::letter::template::Block;
use macroscope::letter::{
    EngagementLetter, FormError, Prompter, engagement_form, render, write_pdf,
};
use std::io::Cursor;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
}

/// Answers in prompt order; blank lines accept defaults.
fn script(confidentiality: &str, notes: &str, output: &str) -> String {
    [
        "Jane Consulting SAS",
        "12 rue de la Paix",
        "75002",
        "Paris",
        "",
        "jane@example.com",
        "123 456 789",
        "",
        "Big Co",
        "John Smith",
        "1 Main Street",
        "69001",
        "Lyon",
        "Data strategy review",
        "",
        "",
        "1 March 2026",
        "30 June 2026",
        "Audit current data flows",
        "Recommend a target architecture",
        "",
        "",
        "",
        "EUR 15,000 excl. VAT",
        "",
        "",
        "",
        confidentiality,
        "",
        "",
        "",
        notes,
        "",
        "",
        output,
    ]
    .iter()
    .map(|l| format!("{l}\n"))
    .collect()
}

fn run(input: &str) -> Result<EngagementLetter, FormError> {
    let mut out = Vec::new();
    let mut p = Prompter::new(Cursor::new(input.as_bytes().to_vec()), &mut out, today());
    let answers = p.run(&engagement_form())?;
    Ok(EngagementLetter::from_answers(&answers))
}

fn articles(blocks: &[Block]) -> Vec<(u32, String)> {
    blocks
        .iter()
        .filter_map(|b| match b {
            Block::Article { number, title } => Some((*number, title.clone())),
            _ => None,
        })
        .collect()
}

#[test]
fn form_applies_defaults_and_fallbacks() {
    let l = run(&script("n", "", "my_letter")).unwrap();
    assert_eq!(l.provider.name, "Jane Consulting SAS");
    assert_eq!(l.provider.phone, "");
    assert_eq!(l.mission.location, "Lyon");
    assert_eq!(l.mission.objectives.len(), 2);
    assert_eq!(
        l.mission.deliverables,
        vec!["To be agreed jointly by the parties".to_string()]
    );
    assert_eq!(l.fees.kind, "fixed");
    assert_eq!(l.fees.vat, "20 %");
    assert!(!l.confidentiality);
    assert!(l.intellectual_property);
    assert_eq!(l.governing_law, "French law");
    assert_eq!(l.court, "Paris");
    assert_eq!(l.reference, "EL-20260301");
    assert_eq!(l.date, "01/03/2026");
    assert_eq!(l.output, "my_letter.pdf");
}

#[test]
fn default_file_name_uses_client_and_date() {
    let l = run(&script("", "", "")).unwrap();
    assert_eq!(l.output, "engagement_letter_Big_Co_20260301.pdf");
}

#[test]
fn truncated_input_cancels() {
    let full = script("", "", "");
    let half: String = full.lines().take(10).map(|l| format!("{l}\n")).collect();
    assert!(matches!(run(&half), Err(FormError::Cancelled)));
}

#[test]
fn optional_articles_are_numbered_consecutively() {
    let l = run(&script("n", "", "x")).unwrap();
    let doc = render(&l);
    let arts = articles(&doc.blocks);
    let numbers: Vec<u32> = arts.iter().map(|(n, _)| *n).collect();
    assert_eq!(numbers, [1, 2, 3, 4, 5, 6]);
    assert_eq!(arts[4].1, "Intellectual property");
    assert_eq!(arts[5].1, "Governing law and disputes");

    let l = run(&script("y", "Travel expenses are billed at cost.", "x")).unwrap();
    let arts = articles(&render(&l).blocks);
    let titles: Vec<&str> = arts.iter().map(|(_, t)| t.as_str()).collect();
    assert_eq!(
        &titles[4..],
        [
            "Confidentiality",
            "Intellectual property",
            "Additional provisions",
            "Governing law and disputes"
        ]
    );
    assert_eq!(arts.last().map(|(n, _)| *n), Some(8));
}

#[test]
fn fees_table_skips_missing_deposit() {
    let l = run(&script("y", "", "x")).unwrap();
    let doc = render(&l);
    let rows = doc
        .blocks
        .iter()
        .find_map(|b| match b {
            Block::Table(rows) => Some(rows.clone()),
            _ => None,
        })
        .unwrap();
    let labels: Vec<&str> = rows.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(labels, ["Type", "Amount", "VAT", "Payment"]);
    assert_eq!(rows[0].1, "Fixed");
    assert!(doc.footer.contains("Jane Consulting SAS"));
}

#[test]
fn pdf_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("letter.pdf");
    let l = run(&script("y", "Travel expenses are billed at cost.", "x")).unwrap();
    let pages = write_pdf(&render(&l), &path).unwrap();
    assert!(pages >= 1);
    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn long_letters_break_across_pages() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("long.pdf");
    let mut l = run(&script("y", "", "x")).unwrap();
    l.mission.objectives = (1..=120)
        .map(|i| format!("Objective number {i}: review the “current” process and report – in détail"))
        .collect();
    let pages = write_pdf(&render(&l), &path).unwrap();
    assert!(pages >= 3, "{pages}");
}

#[test]
fn unwritable_path_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("letter.pdf");
    let l = run(&script("y", "", "x")).unwrap();
    let err = write_pdf(&render(&l), &path).unwrap_err();
    assert!(format!("{err:#}").contains("letter.pdf"));
}
