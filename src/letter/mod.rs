//! Interactive engagement-letter generator: question form, letter template
//! and PDF layout.

pub mod form;
pub mod pdf;
pub mod template;
pub mod text;

pub use form::{Answers, FormError, Prompter, engagement_form};
pub use pdf::write_pdf;
pub use template::{Document, EngagementLetter, render};
