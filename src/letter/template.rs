//! Engagement-letter template: answers in, ordered layout blocks out.

use super::form::Answers;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Party {
    pub name: String,
    pub address: String,
    pub postcode: String,
    pub city: String,
    pub phone: String,
    pub email: String,
    pub reg_no: String,
    pub vat_no: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    pub company: String,
    pub contact: String,
    pub address: String,
    pub postcode: String,
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mission {
    pub title: String,
    pub context: String,
    pub location: String,
    pub start: String,
    pub end: String,
    pub objectives: Vec<String>,
    pub deliverables: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fees {
    pub kind: String,
    pub amount: String,
    pub vat: String,
    pub payment: String,
    pub deposit: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngagementLetter {
    pub provider: Party,
    pub client: Client,
    pub mission: Mission,
    pub fees: Fees,
    pub confidentiality: bool,
    pub intellectual_property: bool,
    pub governing_law: String,
    pub court: String,
    pub notes: String,
    pub reference: String,
    pub date: String,
    pub output: String,
}

impl EngagementLetter {
    pub fn from_answers(a: &Answers) -> Self {
        let t = |k: &str| a.text(k).to_string();
        Self {
            provider: Party {
                name: t("provider_name"),
                address: t("provider_address"),
                postcode: t("provider_postcode"),
                city: t("provider_city"),
                phone: t("provider_phone"),
                email: t("provider_email"),
                reg_no: t("provider_reg_no"),
                vat_no: t("provider_vat_no"),
            },
            client: Client {
                company: t("client_company"),
                contact: t("client_contact"),
                address: t("client_address"),
                postcode: t("client_postcode"),
                city: t("client_city"),
            },
            mission: Mission {
                title: t("mission_title"),
                context: t("mission_context"),
                location: t("mission_location"),
                start: t("mission_start"),
                end: t("mission_end"),
                objectives: a.list("objectives").to_vec(),
                deliverables: a.list("deliverables").to_vec(),
            },
            fees: Fees {
                kind: t("fee_type"),
                amount: t("fee_amount"),
                vat: t("fee_vat"),
                payment: t("fee_payment"),
                deposit: t("fee_deposit"),
            },
            confidentiality: a.flag("confidentiality"),
            intellectual_property: a.flag("intellectual_property"),
            governing_law: t("governing_law"),
            court: t("court"),
            notes: t("notes"),
            reference: t("reference"),
            date: t("date"),
            output: t("output"),
        }
    }
}

/// Layout unit handed to the PDF writer. A block that does not fit starts a
/// new page; paragraphs, lists and table rows may continue on the next one.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Provider identity (filled band) beside reference and date.
    Letterhead {
        name: String,
        details: Vec<String>,
        reference: String,
        date: String,
    },
    /// Addressee on the left, place and date on the right.
    Recipient {
        lines: Vec<String>,
        place_date: String,
    },
    Subject(String),
    Paragraph(String),
    /// Numbered article heading bar.
    Article {
        number: u32,
        title: String,
    },
    Bullets(Vec<String>),
    /// Label / value rows.
    Table(Vec<(String, String)>),
    Signatures {
        left: Vec<String>,
        right: Vec<String>,
    },
    Rule,
    /// Vertical gap in millimetres.
    Space(f32),
}

/// A rendered letter ready for layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub title: String,
    /// Printed at the bottom of every page, left of the page number.
    pub footer: String,
    pub blocks: Vec<Block>,
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn join_nonempty(parts: &[String], sep: &str) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join(sep)
}

/// Render the letter into its fixed block sequence. Optional articles are
/// numbered consecutively after Article 4.
pub fn render(l: &EngagementLetter) -> Document {
    let p = &l.provider;
    let c = &l.client;
    let m = &l.mission;
    let mut blocks = Vec::new();

    let mut details = vec![format!("{}  |  {} {}", p.address, p.postcode, p.city)];
    let contact = join_nonempty(
        &[
            (!p.phone.is_empty())
                .then(|| format!("Phone: {}", p.phone))
                .unwrap_or_default(),
            (!p.email.is_empty())
                .then(|| format!("Email: {}", p.email))
                .unwrap_or_default(),
        ],
        "  |  ",
    );
    if !contact.is_empty() {
        details.push(contact);
    }
    if !p.reg_no.is_empty() {
        let mut ids = format!("Reg. no: {}", p.reg_no);
        if !p.vat_no.is_empty() {
            ids.push_str(&format!("  |  VAT: {}", p.vat_no));
        }
        details.push(ids);
    }
    blocks.push(Block::Letterhead {
        name: p.name.clone(),
        details,
        reference: l.reference.clone(),
        date: l.date.clone(),
    });
    blocks.push(Block::Space(6.0));

    blocks.push(Block::Recipient {
        lines: vec![
            c.company.clone(),
            c.contact.clone(),
            c.address.clone(),
            format!("{} {}", c.postcode, c.city),
        ],
        place_date: format!("{}, {}", p.city, l.date),
    });
    blocks.push(Block::Space(7.0));

    blocks.push(Block::Rule);
    blocks.push(Block::Subject(format!("Subject: Engagement letter - {}", m.title)));
    blocks.push(Block::Rule);

    blocks.push(Block::Paragraph(format!("Dear {},", c.contact)));
    blocks.push(Block::Paragraph(format!(
        "We are pleased to send you this engagement letter, which sets out the terms and \
         conditions under which {} (the \"Provider\") will work for {} (the \"Client\").",
        p.name, c.company
    )));
    if !m.context.is_empty() {
        blocks.push(Block::Paragraph(m.context.clone()));
    }
    blocks.push(Block::Space(4.0));

    blocks.push(Block::Article {
        number: 1,
        title: "Purpose of the engagement".into(),
    });
    blocks.push(Block::Paragraph(format!(
        "The Provider is engaged to carry out the following assignment: {}.",
        m.title
    )));
    blocks.push(Block::Paragraph("The objectives of the engagement are:".into()));
    blocks.push(Block::Bullets(m.objectives.clone()));

    blocks.push(Block::Article {
        number: 2,
        title: "Duration and place of performance".into(),
    });
    blocks.push(Block::Paragraph(format!(
        "The engagement will start on {} and is expected to end on {}.",
        m.start, m.end
    )));
    blocks.push(Block::Paragraph(format!(
        "It will be performed mainly at: {}.",
        m.location
    )));

    blocks.push(Block::Article {
        number: 3,
        title: "Deliverables".into(),
    });
    blocks.push(Block::Paragraph(
        "Under this engagement the Provider will deliver to the Client:".into(),
    ));
    blocks.push(Block::Bullets(m.deliverables.clone()));

    blocks.push(Block::Article {
        number: 4,
        title: "Fees and financial terms".into(),
    });
    let f = &l.fees;
    let mut rows = vec![
        ("Type".to_string(), capitalize(&f.kind)),
        ("Amount".to_string(), f.amount.clone()),
        ("VAT".to_string(), f.vat.clone()),
        ("Payment".to_string(), f.payment.clone()),
    ];
    if !f.deposit.is_empty() {
        rows.push(("Deposit".to_string(), f.deposit.clone()));
    }
    blocks.push(Block::Table(rows));

    let mut number = 5;
    if l.confidentiality {
        blocks.push(Block::Article {
            number,
            title: "Confidentiality".into(),
        });
        blocks.push(Block::Paragraph(
            "The Provider undertakes to keep strictly confidential all information, data and \
             documents to which it has access in the course of this engagement, for its duration \
             and for a period of 5 years after its end."
                .into(),
        ));
        number += 1;
    }
    if l.intellectual_property {
        blocks.push(Block::Article {
            number,
            title: "Intellectual property".into(),
        });
        blocks.push(Block::Paragraph(
            "The deliverables produced under this engagement become the exclusive property of \
             the Client upon full payment of the corresponding fees. The Provider retains \
             ownership of its pre-existing methods, know-how and tools."
                .into(),
        ));
        number += 1;
    }
    if !l.notes.is_empty() {
        blocks.push(Block::Article {
            number,
            title: "Additional provisions".into(),
        });
        blocks.push(Block::Paragraph(l.notes.clone()));
        number += 1;
    }
    blocks.push(Block::Article {
        number,
        title: "Governing law and disputes".into(),
    });
    blocks.push(Block::Paragraph(format!(
        "This engagement letter is governed by {}. In the event of a dispute, the parties \
         will seek an amicable solution before any legal action. Failing an amicable \
         agreement, the dispute will be submitted to the exclusive jurisdiction of the court \
         of {}.",
        l.governing_law, l.court
    )));

    blocks.push(Block::Space(8.0));
    blocks.push(Block::Rule);
    blocks.push(Block::Paragraph(
        "Approved: both parties acknowledge having read this engagement letter and accept \
         its terms."
            .into(),
    ));
    blocks.push(Block::Space(6.0));
    let place = "Signed at ____________ on ____________".to_string();
    blocks.push(Block::Signatures {
        left: vec![place.clone(), "Provider's signature".into(), p.name.clone()],
        right: vec![
            place,
            "Client's signature".into(),
            "(preceded by the words \"Read and approved\")".into(),
            c.contact.clone(),
            c.company.clone(),
        ],
    });

    let mut footer = format!("{}  |  {} {}", p.name, p.postcode, p.city);
    if !p.reg_no.is_empty() {
        footer.push_str(&format!("  |  Reg. no {}", p.reg_no));
    }

    Document {
        title: format!("Engagement letter - {}", m.title),
        footer,
        blocks,
    }
}
