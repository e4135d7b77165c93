use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing::warn;

use crate::history::HistoryEntry;
use crate::model::ImageAttachment;
use crate::model_gateway::ModelGateway;
use crate::session::Session;

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Exit,
    History,
    Clear,
    AttachImage(&'a str),
    Ask(&'a str),
}

fn parse_command(line: &str) -> Option<Command<'_>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
        return Some(Command::Exit);
    }
    if line.eq_ignore_ascii_case("/history") {
        return Some(Command::History);
    }
    if line.eq_ignore_ascii_case("/clear") {
        return Some(Command::Clear);
    }
    if let Some(rest) = line.strip_prefix("/image") {
        return Some(Command::AttachImage(rest.trim()));
    }
    Some(Command::Ask(line))
}

pub async fn run_repl<G: ModelGateway>(session: &mut Session<G>, model: &str) -> Result<()> {
    let stdin = io::stdin();
    run_repl_with(session, model, stdin.lock(), io::stdout()).await
}

/// Drives the loop over any line source. Failed questions, clears and image
/// attachments are reported and the loop carries on; only I/O on `input` or
/// `out` ends it with an error.
async fn run_repl_with<G, R, W>(
    session: &mut Session<G>,
    model: &str,
    mut input: R,
    mut out: W,
) -> Result<()>
where
    G: ModelGateway,
    R: BufRead,
    W: Write,
{
    writeln!(out, "Carbon Capture Buddy!")?;
    writeln!(out, "model: {}", model)?;
    writeln!(
        out,
        "ask a question (e.g. 'What is the carbon footprint of a plastic bottle?'), \
         '/image <path>' to attach a picture, '/history' to review, '/clear' to forget, \
         or 'exit' to quit"
    )?;

    let mut pending_image: Option<ImageAttachment> = None;

    loop {
        write!(out, "> ")?;
        out.flush().context("Failed to flush output")?;

        let mut line = String::new();
        let read = input
            .read_line(&mut line)
            .context("Failed to read input")?;
        if read == 0 {
            break;
        }

        let Some(command) = parse_command(&line) else {
            continue;
        };

        match command {
            Command::Exit => break,
            Command::History => print_history(&mut out, session.history())?,
            Command::Clear => match session.clear_history() {
                Ok(()) => writeln!(out, "history cleared\n")?,
                Err(err) => {
                    warn!(error = %err, "failed to clear history");
                    writeln!(out, "{err:#}\n")?;
                }
            },
            Command::AttachImage("") => match pending_image.take() {
                Some(_) => writeln!(out, "image detached\n")?,
                None => writeln!(out, "usage: /image <path to jpg or png>\n")?,
            },
            Command::AttachImage(path) => match ImageAttachment::from_path(Path::new(path)) {
                Ok(image) => {
                    writeln!(
                        out,
                        "attached {} ({} bytes); it will be sent with your next question\n",
                        path,
                        image.data.len()
                    )?;
                    pending_image = Some(image);
                }
                Err(err) => {
                    warn!(path = %path, error = %err, "failed to attach image");
                    writeln!(out, "{err:#}\n")?;
                }
            },
            Command::Ask(question) => match session.ask(question, pending_image.take()).await {
                Ok(answer) => writeln!(out, "Response:\n{}\n", answer.trim())?,
                Err(err) => {
                    warn!(error = %err, "question failed");
                    writeln!(out, "{err:#}\n")?;
                }
            },
        }
    }

    Ok(())
}

fn print_history(out: &mut impl Write, history: &[HistoryEntry]) -> io::Result<()> {
    if history.is_empty() {
        return writeln!(out, "(history is empty)\n");
    }

    for (idx, entry) in history.iter().enumerate() {
        writeln!(out, "[{}] Q: {}", idx, entry.question())?;
        writeln!(out, "    A: {}", entry.answer().trim())?;
    }
    writeln!(out)
}
