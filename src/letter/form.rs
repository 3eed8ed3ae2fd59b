//! Linear terminal form: an ordered field list driven over any reader/writer pair.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormError {
    /// Input ended before the form was complete.
    #[error("cancelled")]
    Cancelled,
    #[error("terminal i/o: {0}")]
    Io(#[from] io::Error),
}

/// How a field's default is obtained.
#[derive(Clone, Copy)]
pub enum DefaultValue {
    None,
    Literal(&'static str),
    /// The answer previously given for another field.
    CopyOf(&'static str),
    /// Computed from earlier answers and today's date.
    Computed(fn(&Answers, NaiveDate) -> String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    YesNo,
    /// One entry per line until a blank line.
    List {
        item: &'static str,
        min: usize,
        /// Stored as the only entry when the list is left empty.
        fallback: Option<&'static str>,
    },
}

#[derive(Clone, Copy)]
pub struct Field {
    pub key: &'static str,
    pub prompt: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: DefaultValue,
    /// Section heading printed before this field.
    pub section: Option<&'static str>,
    /// Applied to the final text answer.
    pub normalize: Option<fn(String) -> String>,
}

impl Field {
    pub const fn text(key: &'static str, prompt: &'static str) -> Self {
        Self {
            key,
            prompt,
            kind: FieldKind::Text,
            required: true,
            default: DefaultValue::None,
            section: None,
            normalize: None,
        }
    }

    pub const fn yes_no(key: &'static str, prompt: &'static str, default: bool) -> Self {
        Self {
            kind: FieldKind::YesNo,
            required: false,
            default: DefaultValue::Literal(if default { "yes" } else { "no" }),
            ..Self::text(key, prompt)
        }
    }

    pub const fn list(
        key: &'static str,
        prompt: &'static str,
        item: &'static str,
        min: usize,
        fallback: Option<&'static str>,
    ) -> Self {
        Self {
            kind: FieldKind::List {
                item,
                min,
                fallback,
            },
            required: min > 0,
            ..Self::text(key, prompt)
        }
    }

    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub const fn default(mut self, d: DefaultValue) -> Self {
        self.default = d;
        self
    }

    pub const fn section(mut self, title: &'static str) -> Self {
        self.section = Some(title);
        self
    }

    pub const fn normalize(mut self, f: fn(String) -> String) -> Self {
        self.normalize = Some(f);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Text(String),
    Flag(bool),
    List(Vec<String>),
}

/// Collected answers keyed by field key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Answers(BTreeMap<&'static str, Answer>);

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &'static str, answer: Answer) {
        self.0.insert(key, answer);
    }

    /// Text answer, empty when absent or of another kind.
    pub fn text(&self, key: &str) -> &str {
        match self.0.get(key) {
            Some(Answer::Text(s)) => s,
            _ => "",
        }
    }

    pub fn flag(&self, key: &str) -> bool {
        matches!(self.0.get(key), Some(Answer::Flag(true)))
    }

    pub fn list(&self, key: &str) -> &[String] {
        match self.0.get(key) {
            Some(Answer::List(v)) => v,
            _ => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// `y`, `yes`, `o`, `oui`, `1` (any case) mean yes.
pub fn is_yes(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "o" | "oui" | "1"
    )
}

/// Asks questions on `output`, reads answers from `input`.
pub struct Prompter<R, W> {
    input: R,
    output: W,
    today: NaiveDate,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W, today: NaiveDate) -> Self {
        Self {
            input,
            output,
            today,
        }
    }

    fn read_line(&mut self) -> Result<String, FormError> {
        self.output.flush()?;
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            return Err(FormError::Cancelled);
        }
        Ok(buf.trim().to_string())
    }

    /// Free text. Blank input yields the default, else empty when optional;
    /// required fields re-prompt until answered.
    pub fn ask_text(
        &mut self,
        question: &str,
        default: Option<&str>,
        required: bool,
    ) -> Result<String, FormError> {
        loop {
            match default {
                Some(d) if !d.is_empty() => write!(self.output, "  {question} [{d}]: ")?,
                _ => write!(self.output, "  {question}: ")?,
            }
            let answer = self.read_line()?;
            if !answer.is_empty() {
                return Ok(answer);
            }
            if let Some(d) = default {
                return Ok(d.to_string());
            }
            if !required {
                return Ok(String::new());
            }
            writeln!(self.output, "  ! This field is required.")?;
        }
    }

    pub fn ask_yes_no(&mut self, question: &str, default: bool) -> Result<bool, FormError> {
        let d = if default { "yes" } else { "no" };
        self.ask_text(question, Some(d), false).map(|a| is_yes(&a))
    }

    /// One entry per line; a blank line ends the list once `min` entries exist.
    pub fn ask_list(&mut self, item: &str, min: usize) -> Result<Vec<String>, FormError> {
        let mut items = Vec::new();
        loop {
            write!(self.output, "    {item} {} (blank to finish): ", items.len() + 1)?;
            let answer = self.read_line()?;
            if !answer.is_empty() {
                items.push(answer);
                continue;
            }
            if items.len() >= min {
                return Ok(items);
            }
            writeln!(self.output, "  ! Enter at least {min} item(s).")?;
        }
    }

    /// Ask every field in order.
    pub fn run(&mut self, fields: &[Field]) -> Result<Answers, FormError> {
        let mut answers = Answers::new();
        for field in fields {
            if let Some(title) = field.section {
                writeln!(self.output)?;
                writeln!(self.output, "-- {title} --")?;
            }
            let default = match field.default {
                DefaultValue::None => None,
                DefaultValue::Literal(s) => Some(s.to_string()),
                DefaultValue::CopyOf(key) => {
                    Some(answers.text(key).to_string()).filter(|s| !s.is_empty())
                }
                DefaultValue::Computed(f) => Some(f(&answers, self.today)),
            };
            let answer = match field.kind {
                FieldKind::Text => {
                    let mut text = self.ask_text(field.prompt, default.as_deref(), field.required)?;
                    if let Some(f) = field.normalize {
                        text = f(text);
                    }
                    Answer::Text(text)
                }
                FieldKind::YesNo => {
                    let d = default.as_deref().is_none_or(is_yes);
                    Answer::Flag(self.ask_yes_no(field.prompt, d)?)
                }
                FieldKind::List {
                    item,
                    min,
                    fallback,
                } => {
                    writeln!(self.output, "  {}", field.prompt)?;
                    let mut items = self.ask_list(item, min)?;
                    if items.is_empty()
                        && let Some(fb) = fallback
                    {
                        items.push(fb.to_string());
                    }
                    Answer::List(items)
                }
            };
            answers.insert(field.key, answer);
        }
        Ok(answers)
    }
}

fn reference_default(_: &Answers, today: NaiveDate) -> String {
    format!("EL-{}", today.format("%Y%m%d"))
}

fn date_default(_: &Answers, today: NaiveDate) -> String {
    today.format("%d/%m/%Y").to_string()
}

fn file_default(a: &Answers, today: NaiveDate) -> String {
    let client = a.text("client_company").replace(' ', "_").replace('/', "-");
    format!("engagement_letter_{client}_{}.pdf", today.format("%Y%m%d"))
}

/// Output file names always end in `.pdf`.
pub fn ensure_pdf(name: String) -> String {
    if name.to_lowercase().ends_with(".pdf") {
        name
    } else {
        format!("{name}.pdf")
    }
}

/// Fields of an engagement letter, in prompt order.
pub fn engagement_form() -> Vec<Field> {
    use DefaultValue::{Computed, CopyOf, Literal};
    vec![
        Field::text("provider_name", "Name / company name").section("PROVIDER (you / your firm)"),
        Field::text("provider_address", "Address (street)"),
        Field::text("provider_postcode", "Postcode"),
        Field::text("provider_city", "City"),
        Field::text("provider_phone", "Phone").optional(),
        Field::text("provider_email", "Email").optional(),
        Field::text("provider_reg_no", "Company registration number").optional(),
        Field::text("provider_vat_no", "VAT number").optional(),
        Field::text("client_company", "Company name").section("CLIENT"),
        Field::text("client_contact", "Contact person"),
        Field::text("client_address", "Address (street)"),
        Field::text("client_postcode", "Postcode"),
        Field::text("client_city", "City"),
        Field::text("mission_title", "Engagement title").section("ENGAGEMENT"),
        Field::text("mission_context", "Context / short description").optional(),
        Field::text("mission_location", "Place of performance").default(CopyOf("client_city")),
        Field::text("mission_start", "Start date (e.g. 1 March 2026)"),
        Field::text("mission_end", "End date (e.g. 30 June 2026)"),
        Field::list("objectives", "Objectives, one per line:", "Objective", 1, None)
            .section("OBJECTIVES"),
        Field::list(
            "deliverables",
            "Deliverables, one per line:",
            "Deliverable",
            0,
            Some("To be agreed jointly by the parties"),
        )
        .section("DELIVERABLES"),
        Field::text("fee_type", "Fee type (fixed / time and materials / daily rate)")
            .default(Literal("fixed"))
            .section("FEES"),
        Field::text("fee_amount", "Amount (e.g. EUR 15,000 excl. VAT or EUR 850/day)"),
        Field::text("fee_vat", "VAT rate").default(Literal("20 %")),
        Field::text("fee_payment", "Payment terms").default(Literal("30 days end of month")),
        Field::text("fee_deposit", "Deposit on signature").optional(),
        Field::yes_no("confidentiality", "Confidentiality clause?", true).section("CLAUSES"),
        Field::yes_no("intellectual_property", "Intellectual property clause?", true),
        Field::text("governing_law", "Governing law").default(Literal("French law")),
        Field::text("court", "Competent court").default(Literal("Paris")),
        Field::text("notes", "Additional provisions / notes").optional(),
        Field::text("reference", "Letter reference")
            .default(Computed(reference_default))
            .section("OUTPUT"),
        Field::text("date", "Letter date").default(Computed(date_default)),
        Field::text("output", "PDF file name")
            .default(Computed(file_default))
            .normalize(ensure_pdf),
    ]
}
