use std::io::Write;

use anyhow::{Result, bail};
use lazyseq::{Control, Sequence, SequenceExt, range, range_infinite, range_pull};

pub struct RangeArgs {
    pub start: i64,
    pub end: i64,
    pub step: i64,
    pub pull: bool,
    pub infinite: bool,
    pub take: Option<usize>,
}

pub fn run(args: RangeArgs) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_range(&args, &mut out)?;
    out.flush()?;
    Ok(())
}

fn write_range<W: Write>(args: &RangeArgs, out: &mut W) -> Result<()> {
    if args.infinite {
        let Some(take) = args.take else {
            bail!("--infinite requires --take");
        };
        if args.pull {
            let cursor = range_infinite(args.start, args.step).pull();
            for value in cursor.take(take) {
                writeln!(out, "{value}")?;
            }
            return Ok(());
        }
        return print_values(&mut range_infinite(args.start, args.step), Some(take), out);
    }

    tracing::debug!(
        start = args.start,
        end = args.end,
        step = args.step,
        pull = args.pull,
        "range"
    );
    if args.pull {
        print_values(&mut range_pull(args.start, args.end, args.step), args.take, out)
    } else {
        print_values(&mut range(args.start, args.end, args.step), args.take, out)
    }
}

fn print_values<S, W>(seq: &mut S, take: Option<usize>, out: &mut W) -> Result<()>
where
    S: Sequence<Item = i64>,
    W: Write,
{
    if take == Some(0) {
        return Ok(());
    }
    let mut failure = None;
    let mut printed = 0;
    seq.iterate(|value| {
        if let Err(e) = writeln!(out, "{value}") {
            failure = Some(e);
            return Control::Stop;
        }
        printed += 1;
        Control::from(take.is_none_or(|take| printed < take))
    });
    match failure {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
