//! User interaction operations (index selection prompt).

use anyhow::{Result, bail};

use super::RealRuntime;

use std::io::{self, BufRead, Write};

/// Core, testable implementation that reads from any BufRead and writes to any Write.
///
/// Asks until the operator enters an integer in `0..count`. Running out of input
/// is an error, since there is nobody left to answer.
pub(crate) fn select_with_io<R: BufRead, W: Write>(
    prompt: &str,
    count: usize,
    input: &mut R,
    output: &mut W,
) -> Result<usize> {
    if count == 0 {
        bail!("nothing to choose from");
    }

    loop {
        write!(output, "{} ", prompt)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            bail!("no selection was entered (end of input)");
        }

        match line.trim().parse::<usize>() {
            Ok(index) if index < count => return Ok(index),
            Ok(index) => {
                writeln!(output, "{} is out of range, enter a number from 0 to {}", index, count - 1)?;
            }
            Err(_) => {
                writeln!(output, "{:?} is not a number, enter a number from 0 to {}", line.trim(), count - 1)?;
            }
        }
    }
}

impl RealRuntime {
    pub(crate) fn select_impl(&self, prompt: &str, count: usize) -> Result<usize> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let mut stdin_lock = stdin.lock();
        select_with_io(prompt, count, &mut stdin_lock, &mut stdout)
    }
}
