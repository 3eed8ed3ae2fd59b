use anyhow::Result;
use chrono::Local;
use macroscope::letter::{self, EngagementLetter, FormError, Prompter};
use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            println!("\nCancelled.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// `Ok(false)` when the user closed the input before the form was complete.
fn run() -> Result<bool> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let today = Local::now().date_naive();
    println!("Engagement letter generator");
    println!("Press Enter to accept the value in [brackets]. Ctrl-D cancels.");

    let mut prompter = Prompter::new(stdin.lock(), stdout.lock(), today);
    let answers = match prompter.run(&letter::engagement_form()) {
        Ok(a) => a,
        Err(FormError::Cancelled) => return Ok(false),
        Err(e) => return Err(e.into()),
    };
    drop(prompter);

    let data = EngagementLetter::from_answers(&answers);
    let doc = letter::render(&data);
    let pages = letter::write_pdf(&doc, &data.output)?;
    let mut out = io::stdout();
    writeln!(out, "\nWrote {} ({pages} page(s)).", data.output)?;
    Ok(true)
}
