//! Confirmation gate shown before a load writes to the store.

use std::io::{self, BufRead, Write};

/// Print `prompt` and read one answer. Only `y` or `yes` (any case) confirm;
/// end of input declines.
pub fn confirm<R, W>(prompt: &str, mut input: R, mut output: W) -> io::Result<bool>
where
    R: BufRead,
    W: Write,
{
    write!(output, "{prompt} [y/N] ")?;
    output.flush()?;
    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        writeln!(output)?;
        return Ok(false);
    }
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
