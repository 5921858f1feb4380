use std::io::Read;

use lazyseq::{
    Control, ErrorKind, FileScope, LineOptions, Lines, Phase, Sequence, SequenceExt, pull,
    query_rows, read_lines, rows, with_file,
};
use lazyseq_testkit::{
    cursor::{ScriptedCursor, ScriptedQuery},
    fixtures,
    open::MemoryOpen,
};

fn numbered_content(count: usize) -> String {
    let mut content = fixtures::numbered_lines(count).join("\n");
    content.push('\n');
    content
}

/// Runs `seq` answering `Continue` to everything, including errors.
fn drain<S: Sequence>(seq: &mut S) -> Vec<S::Item> {
    let mut items = Vec::new();
    seq.iterate(|item| {
        items.push(item);
        Control::Continue
    });
    items
}

#[test]
fn test_lines_from_disk() {
    let file = fixtures::lines_file(&["first", "", "third"]).unwrap();
    let lines: Vec<Vec<u8>> = read_lines(file.path())
        .collect_vec()
        .into_iter()
        .map(|line| line.unwrap())
        .collect();
    assert_eq!(lines, vec![b"first".to_vec(), Vec::new(), b"third".to_vec()]);
}

#[test]
fn test_lines_release_once_on_early_stop() {
    fastrand::seed(7243019);
    for _ in 0..20 {
        let count = fastrand::usize(1..40);
        let k = fastrand::usize(1..=count);
        let open = MemoryOpen::new().with_file("data.txt", numbered_content(count));
        let mut seq = Lines::with_opener("data.txt", open.clone());

        let lines = seq.take_vec(k);
        assert_eq!(lines.len(), k);
        assert_eq!(lines[k - 1].as_ref().unwrap(), format!("line {}", k - 1).as_bytes());
        assert_eq!(open.opens(), 1);
        assert_eq!(open.releases(), 1);
        assert_eq!(seq.phase(), Phase::StoppedByConsumer);
    }
}

#[test]
fn test_lines_reopen_on_every_run() {
    let open = MemoryOpen::new().with_file("data.txt", numbered_content(3));
    let mut seq = Lines::with_opener("data.txt", open.clone());
    assert_eq!(seq.collect_vec().len(), 3);
    assert_eq!(seq.phase(), Phase::Exhausted);
    assert_eq!(seq.collect_vec().len(), 3);
    assert_eq!(open.opens(), 2);
    assert_eq!(open.releases(), 2);
}

#[test]
fn test_missing_file_yields_single_error() {
    let open = MemoryOpen::new();
    let mut seq = Lines::with_opener("missing.txt", open.clone());
    let items = drain(&mut seq);
    assert_eq!(items.len(), 1);
    let err = items.into_iter().next().unwrap().unwrap_err();
    assert!(err.is_acquisition());
    assert!(matches!(err.kind(), ErrorKind::Open { .. }));
    assert_eq!(seq.phase(), Phase::AcquireFailed);
    assert_eq!(open.opens(), 0);
    assert_eq!(open.releases(), 0);
}

#[test]
fn test_missing_file_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let items = drain(&mut read_lines(dir.path().join("nothing-here")));
    assert_eq!(items.len(), 1);
    assert!(matches!(
        items[0].as_ref().unwrap_err().kind(),
        ErrorKind::Open { .. }
    ));
}

#[test]
fn test_read_fault_ends_the_run() {
    let open = MemoryOpen::new().with_faulty_file("faulty.txt", "a\nb\nccccc\nd\n", 5);
    let mut seq = Lines::with_opener("faulty.txt", open.clone());
    let items = drain(&mut seq);
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].as_ref().unwrap(), b"a");
    assert_eq!(items[1].as_ref().unwrap(), b"b");
    assert!(matches!(
        items[2].as_ref().unwrap_err().kind(),
        ErrorKind::Read { line: 3, .. }
    ));
    assert_eq!(seq.phase(), Phase::Errored);
    assert_eq!(open.releases(), 1);
}

#[test]
fn test_line_too_long_ends_the_run() {
    let open = MemoryOpen::new().with_file("long.txt", "ab\nabcdefgh\nc\n");
    let options = LineOptions {
        max_line_len: 4,
        ..LineOptions::default()
    };
    let mut seq = Lines::with_opener("long.txt", open.clone())
        .with_options(options)
        .unwrap();
    let items = drain(&mut seq);
    assert_eq!(items.len(), 2);
    assert!(matches!(
        items[1].as_ref().unwrap_err().kind(),
        ErrorKind::LineTooLong { line: 2, limit: 4, .. }
    ));
    assert_eq!(open.releases(), 1);
}

#[test]
fn test_pulled_lines_release_on_stop() {
    let open = MemoryOpen::new().with_file("data.txt", numbered_content(100));
    let mut cursor = pull(Lines::with_opener("data.txt", open.clone()));
    assert_eq!(cursor.next().unwrap().unwrap(), b"line 0");
    assert_eq!(cursor.next().unwrap().unwrap(), b"line 1");
    assert_eq!(open.open_handles(), 1);
    cursor.stop();
    assert_eq!(open.opens(), 1);
    assert_eq!(open.releases(), 1);
}

#[test]
fn test_pulled_lines_release_on_drop() {
    let open = MemoryOpen::new().with_file("data.txt", numbered_content(100));
    let mut cursor = Lines::with_opener("data.txt", open.clone()).pull();
    assert!(cursor.next().is_some());
    drop(cursor);
    assert_eq!(open.opens(), 1);
    assert_eq!(open.releases(), 1);
}

#[test]
fn test_unpulled_lines_never_open() {
    let open = MemoryOpen::new().with_file("data.txt", numbered_content(3));
    let cursor = Lines::with_opener("data.txt", open.clone()).pull();
    drop(cursor);
    assert_eq!(open.opens(), 0);
}

#[test]
fn test_file_scope_lends_handle_once() {
    let open = MemoryOpen::new().with_file("scoped.txt", "scoped content");
    let mut scope = FileScope::with_opener("scoped.txt", open.clone());

    let mut calls = 0;
    let mut content = String::new();
    scope.iterate(|handle| {
        calls += 1;
        handle.unwrap().read_to_string(&mut content).unwrap();
        Control::Continue
    });
    assert_eq!(calls, 1);
    assert_eq!(content, "scoped content");
    assert_eq!(scope.phase(), Phase::Exhausted);
    assert_eq!(open.releases(), 1);

    scope.iterate(|_| Control::Stop);
    assert_eq!(scope.phase(), Phase::StoppedByConsumer);
    assert_eq!(open.opens(), 2);
    assert_eq!(open.releases(), 2);
}

#[test]
fn test_file_scope_missing_file() {
    let open = MemoryOpen::new();
    let mut scope = FileScope::with_opener("absent", open.clone());
    let mut errors = 0;
    scope.iterate(|handle| {
        assert!(matches!(handle.unwrap_err().kind(), ErrorKind::Open { .. }));
        errors += 1;
        Control::Continue
    });
    assert_eq!(errors, 1);
    assert_eq!(scope.phase(), Phase::AcquireFailed);
    assert_eq!(open.releases(), 0);
}

#[test]
fn test_with_file_on_disk() {
    let file = fixtures::bytes_file(b"0123456789").unwrap();
    let mut len = 0;
    with_file(file.path()).iterate(|handle| {
        let mut buf = Vec::new();
        len = handle.unwrap().read_to_end(&mut buf).unwrap();
        Control::Continue
    });
    assert_eq!(len, 10);
}

#[test]
fn test_query_fault_after_two_rows() {
    let query = ScriptedQuery::new(1..=5).failing_on(3);
    let mut seq = query_rows(query);
    let items = drain(&mut seq);
    assert_eq!(items.len(), 3);
    assert_eq!(*items[0].as_ref().unwrap(), 1);
    assert_eq!(*items[1].as_ref().unwrap(), 2);
    let err = items.into_iter().nth(2).unwrap().unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::QueryFetch { row: 2, .. }));
    assert_eq!(seq.phase(), Phase::Errored);
    assert_eq!(seq.query().calls(), 3);
    assert_eq!(seq.query().cursors_dropped(), 1);
}

#[test]
fn test_query_rejected() {
    let mut seq = query_rows(ScriptedQuery::new(1..=5).rejecting("no such table"));
    let items = drain(&mut seq);
    assert_eq!(items.len(), 1);
    let err = items.into_iter().next().unwrap().unwrap_err();
    assert!(err.is_acquisition());
    assert!(matches!(err.kind(), ErrorKind::QueryRead { .. }));
    assert_eq!(seq.phase(), Phase::AcquireFailed);
    assert_eq!(seq.query().calls(), 0);
}

#[test]
fn test_query_early_stop_releases_cursor() {
    fastrand::seed(90210);
    for _ in 0..20 {
        let count = fastrand::usize(1..30);
        let k = fastrand::usize(1..=count);
        let mut seq = query_rows(ScriptedQuery::new(0..count as u64));
        let taken = seq.take_vec(k);
        assert_eq!(taken.len(), k);
        assert_eq!(seq.phase(), Phase::StoppedByConsumer);
        assert_eq!(seq.query().calls(), k);
        assert_eq!(seq.query().cursors_dropped(), 1);
    }
}

#[test]
fn test_query_reexecutes_on_every_run() {
    let mut seq = query_rows(ScriptedQuery::new(vec!["a".to_string(), "b".to_string()]));
    assert_eq!(seq.collect_vec().len(), 2);
    assert_eq!(seq.collect_vec().len(), 2);
    assert_eq!(seq.query().reads(), 2);
    assert_eq!(seq.query().cursors_dropped(), 2);
    assert_eq!(seq.phase(), Phase::Exhausted);
}

#[test]
fn test_pulled_query_drops_cursor_on_stop() {
    let query = ScriptedQuery::new(0..1000u32);
    let probe = query.clone();
    let mut cursor = pull(query_rows(query));
    assert_eq!(cursor.next().unwrap().unwrap(), 0);
    cursor.stop();
    assert_eq!(probe.cursors_dropped(), 1);
}

#[test]
fn test_rows_continue_across_runs() {
    let cursor = ScriptedCursor::new(10..20u8).failing_on(6);
    let calls = cursor.calls();
    let drops = cursor.drops();
    let mut seq = rows(cursor);

    assert_eq!(seq.take_vec(3).len(), 3);
    let rest = drain(&mut seq);
    assert_eq!(rest.len(), 3);
    assert_eq!(*rest[0].as_ref().unwrap(), 13);
    assert!(matches!(
        rest[2].as_ref().unwrap_err().kind(),
        ErrorKind::QueryFetch { row: 5, .. }
    ));
    assert_eq!(seq.fetched(), 5);
    assert_eq!(calls.get(), 6);

    drop(seq);
    assert_eq!(drops.get(), 1);
}

#[test]
fn test_pulled_lines_match_direct_iteration() {
    let file = fixtures::lines_file(&["alpha", "beta", "gamma", "delta"]).unwrap();
    let direct: Vec<Vec<u8>> = read_lines(file.path())
        .collect_vec()
        .into_iter()
        .map(|line| line.unwrap())
        .collect();
    let pulled: Vec<Vec<u8>> = read_lines(file.path())
        .pull()
        .map(|line| line.unwrap())
        .collect();
    assert_eq!(pulled, direct);
}

#[test]
fn test_unbounded_line_limit_spans_buffer_fills() {
    let mut content = "y".repeat(20_000);
    content.push_str("\nshort\n");
    let open = MemoryOpen::new().with_file("wide.txt", content);
    let options = LineOptions {
        max_line_len: usize::MAX,
        buffer_capacity: 16,
    };
    let mut seq = Lines::with_opener("wide.txt", open.clone())
        .with_options(options)
        .unwrap();
    let lines: Vec<Vec<u8>> = drain(&mut seq).into_iter().map(|l| l.unwrap()).collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].len(), 20_000);
    assert_eq!(lines[1], b"short");
    assert_eq!(seq.phase(), Phase::Exhausted);
    assert_eq!(open.releases(), 1);
}
