use std::{
    io::{Read, Write},
    path::Path,
};

use anyhow::{Context, Result};
use lazyseq::{Control, read_lines, with_file};

pub fn run(path: String, whole: bool) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_lines(Path::new(&path), &mut out)?;
    if whole {
        let content = read_whole(Path::new(&path))?;
        tracing::debug!(bytes = content.len(), "whole file contents: {content}");
        writeln!(out, "{} bytes", content.len())?;
    }
    out.flush()?;
    Ok(())
}

/// Writes every line of the file at `path`, stopping at the first failure.
fn write_lines<W: Write>(path: &Path, out: &mut W) -> Result<u64> {
    let mut count = 0;
    let mut failure: Option<anyhow::Error> = None;
    read_lines(path).for_each_line(|line| {
        let written = match line {
            Ok(line) => {
                writeln!(out, "{}", String::from_utf8_lossy(line)).map_err(anyhow::Error::from)
            }
            Err(e) => Err(e.into()),
        };
        match written {
            Ok(()) => {
                count += 1;
                Control::Continue
            }
            Err(e) => {
                failure = Some(e);
                Control::Stop
            }
        }
    });
    match failure {
        Some(e) => Err(e).with_context(|| format!("Failed to read lines of {}", path.display())),
        None => Ok(count),
    }
}

/// Reads the whole file through a handle scoped to a single callback.
fn read_whole(path: &Path) -> Result<String> {
    let mut content = None;
    with_file(path).iterate(|file| {
        content = Some(
            file.map_err(anyhow::Error::from)
                .and_then(|file| {
                    let mut buf = String::new();
                    file.read_to_string(&mut buf)?;
                    Ok(buf)
                }),
        );
        Control::Continue
    });
    match content {
        Some(content) => content.with_context(|| format!("Failed to read {}", path.display())),
        None => anyhow::bail!("No handle produced for {}", path.display()),
    }
}
