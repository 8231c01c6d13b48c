//! Line-based selection prompt.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};

use crate::domain::model::Satchel;

/// List entries in satchel order and read one selector line.
///
/// Returns `None` when the answer is blank or input is closed.
pub fn choose<R, W>(satchel: &Satchel, label: &str, mut input: R, mut output: W) -> Result<Option<String>>
where
    R: BufRead,
    W: Write,
{
    for (index, entry) in satchel.entries().iter().enumerate() {
        writeln!(output, "{:>3}) {entry}", index + 1).context("failed to write prompt")?;
    }
    write!(output, "{label}: ").context("failed to write prompt")?;
    output.flush().context("failed to flush prompt")?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .context("failed to read selection")?;

    let answer = answer.trim();
    if answer.is_empty() {
        Ok(None)
    } else {
        Ok(Some(answer.to_owned()))
    }
}
