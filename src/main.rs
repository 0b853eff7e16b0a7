use std::io::{self, BufRead, Write};
use symcalc::Processor;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut processor = Processor::new();

    write!(out, "> ")?;
    out.flush()?;

    for line in stdin.lock().lines() {
        let line = line?;
        let command = line.trim();

        if command == "exit" {
            break;
        }

        match processor.process(command) {
            Ok(answer) => {
                if !answer.is_empty() {
                    writeln!(out, "\x1b[1;32m{}\x1b[0m", answer.trim_end())?;
                }
            },
            Err(e) => writeln!(out, "\x1b[1;31m{}\x1b[0m", e)?,
        }

        write!(out, "> ")?;
        out.flush()?;
    }

    Ok(())
}
