//! Temporary file fixtures.

use std::io::Write;

use tempfile::NamedTempFile;

/// Creates a temporary file holding `lines`, each followed by `\n`.
pub fn lines_file(lines: &[&str]) -> anyhow::Result<NamedTempFile> {
    let mut content = String::new();
    for line in lines {
        content.push_str(line);
        content.push('\n');
    }
    bytes_file(content.as_bytes())
}

/// Creates a temporary file holding exactly `content`.
pub fn bytes_file(content: &[u8]) -> anyhow::Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(content)?;
    file.flush()?;
    Ok(file)
}

/// `count` numbered lines: `line 0`, `line 1`, ...
pub fn numbered_lines(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("line {i}")).collect()
}
