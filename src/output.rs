//! Output formatting for record query results

use memchr::memmem;
use std::io;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// How records are printed
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintOptions {
    /// Prefix each record with its position in the result list
    pub number: bool,
}

pub fn stdout(color: bool) -> StandardStream {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

/// Print records, one per line, highlighting every occurrence of `highlight`
pub fn print_records<W: WriteColor>(
    out: &mut W,
    records: &[Vec<u8>],
    highlight: Option<&[u8]>,
    options: PrintOptions,
) -> io::Result<()> {
    for (i, record) in records.iter().enumerate() {
        if options.number {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
            write!(out, "{}", i)?;
            out.reset()?;
            write!(out, ":")?;
        }
        match highlight {
            Some(pattern) if !pattern.is_empty() => print_highlighted(out, record, pattern)?,
            _ => out.write_all(record)?,
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Print a record with each non-overlapping match in bold red
fn print_highlighted<W: WriteColor>(out: &mut W, record: &[u8], pattern: &[u8]) -> io::Result<()> {
    let mut last = 0;
    for start in memmem::find_iter(record, pattern) {
        if start < last {
            continue;
        }
        out.write_all(&record[last..start])?;
        out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
        out.write_all(&record[start..start + pattern.len()])?;
        out.reset()?;
        last = start + pattern.len();
    }
    out.write_all(&record[last..])
}

/// Print record ids, one per line
pub fn print_ids<W: WriteColor>(out: &mut W, ids: impl IntoIterator<Item = u32>) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    for id in ids {
        writeln!(out, "{}", id)?;
    }
    out.reset()
}

/// Print a `label: value` line with the label in magenta
pub fn print_field<W: WriteColor>(out: &mut W, label: &str, value: impl std::fmt::Display) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
    write!(out, "{}", label)?;
    out.reset()?;
    writeln!(out, ": {}", value)
}
