use std::io::Write;

use anyhow::{Context, Result};
use lazyseq::{
    Control, Query, Sequence,
    query::memory::{MemoryQuery, MemoryTable},
    query_rows, rows,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct Row {
    id: i64,
    name: String,
}

pub fn run(table: String, limit: Option<usize>, executed: bool) -> Result<()> {
    let table = MemoryTable::from_path(&table)
        .with_context(|| format!("Failed to load table: {table}"))?;
    let mut query = table.select::<Row>();
    if let Some(limit) = limit {
        query = query.with_limit(limit);
    }

    let results = if executed {
        fetch_executed(&query)?
    } else {
        fetch(query)?
    };
    tracing::debug!(rows = results.len(), "query finished");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for result in results {
        writeln!(out, "{result}")?;
    }
    out.flush()?;
    Ok(())
}

/// Runs the query through `query_rows`, which executes it and owns the cursor.
fn fetch(query: MemoryQuery<Row>) -> Result<Vec<String>> {
    collect(&mut query_rows(query))
}

/// Executes the query up front, then streams the remaining rows of its cursor.
fn fetch_executed(query: &MemoryQuery<Row>) -> Result<Vec<String>> {
    let cursor = query.read().context("Failed to execute query")?;
    collect(&mut rows(cursor))
}

fn collect<S>(seq: &mut S) -> Result<Vec<String>>
where
    S: Sequence<Item = lazyseq::Result<Row>>,
{
    let mut results = Vec::new();
    let mut failure = None;
    seq.iterate(|row| match row {
        Ok(row) => {
            results.push(format!("Id: {}, Name: {}", row.id, row.name));
            Control::Continue
        }
        Err(e) => {
            failure = Some(e);
            Control::Stop
        }
    });
    match failure {
        Some(e) => Err(e).context("Failed to retrieve row"),
        None => Ok(results),
    }
}
