#![cfg(unix)]

use logdiff_core::{
    CancellationToken, Comparator, CompareRequest, DecodeErrorKind, LogDecoder, MavlogdumpDecoder,
};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::{tempdir, TempDir};

/// Stand-in for mavlogdump.py: prints `<log>.<TYPE>.csv` when present.
/// A log whose content starts with FAIL or SLEEP misbehaves accordingly.
const FAKE_DECODER: &str = r#"#!/bin/sh
if [ "$1" != "--format" ] || [ "$2" != "csv" ] || [ "$3" != "--types" ]; then
  echo "unexpected arguments: $*" >&2
  exit 2
fi
types="$4"
for log; do :; done
case "$(head -c 5 "$log")" in
  FAIL*) echo "corrupt log header" >&2; exit 1 ;;
  SLEEP) exec sleep 30 ;;
esac
if [ -f "$log.$types.csv" ]; then
  cat "$log.$types.csv"
fi
"#;

fn install_decoder(dir: &Path) -> PathBuf {
    let path = dir.join("fake-mavlogdump");
    fs::write(&path, FAKE_DECODER).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn write_log(dir: &Path, name: &str, content: &str, tables: &[(&str, &str)]) -> PathBuf {
    let log = dir.join(name);
    fs::write(&log, content).unwrap();
    for (tag, csv) in tables {
        fs::write(dir.join(format!("{name}.{tag}.csv")), csv).unwrap();
    }
    log
}

fn setup() -> (TempDir, MavlogdumpDecoder) {
    let dir = tempdir().unwrap();
    let program = install_decoder(dir.path());
    (dir, MavlogdumpDecoder::new(program))
}

#[test]
fn decodes_csv_written_by_the_child() {
    let (dir, decoder) = setup();
    let log = write_log(
        dir.path(),
        "flight.bin",
        "BIN",
        &[("MSG", "timestamp,TimeUS,Message\n5.0,5000000,ARMED\n")],
    );
    let table = decoder
        .decode(&log, &["MSG"], &CancellationToken::new())
        .unwrap();
    assert_eq!(table.headers, ["timestamp", "TimeUS", "Message"]);
    assert_eq!(table.records.len(), 1);
    assert_eq!(table.records[0].cells[2], "ARMED");
}

#[test]
fn no_rows_of_requested_type_is_an_empty_table() {
    let (dir, decoder) = setup();
    let log = write_log(dir.path(), "flight.bin", "BIN", &[]);
    let table = decoder
        .decode(&log, &["CTUN"], &CancellationToken::new())
        .unwrap();
    assert!(table.is_empty());
}

#[test]
fn failing_decoder_reports_exit_code_and_stderr() {
    let (dir, decoder) = setup();
    let log = write_log(dir.path(), "broken.bin", "FAIL", &[]);
    let err = decoder
        .decode(&log, &["ATT"], &CancellationToken::new())
        .unwrap_err();
    match &err.kind {
        DecodeErrorKind::Failed { code, stderr } => {
            assert_eq!(*code, Some(1));
            assert!(stderr.contains("corrupt log header"));
        }
        other => panic!("unexpected kind: {other:?}"),
    }
    assert_eq!(err.path, log);
}

#[test]
fn hung_decoder_is_killed_after_timeout() {
    let (dir, decoder) = setup();
    let decoder = decoder.with_timeout(Duration::from_millis(200));
    let log = write_log(dir.path(), "hang.bin", "SLEEP", &[]);
    let started = Instant::now();
    let err = decoder
        .decode(&log, &["ATT"], &CancellationToken::new())
        .unwrap_err();
    assert_eq!(
        err.kind,
        DecodeErrorKind::TimedOut {
            timeout: Duration::from_millis(200)
        }
    );
    assert!(err.to_string().ends_with("decoder timed out after 200ms"));
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[test]
fn cancellation_kills_a_running_decoder() {
    let (dir, decoder) = setup();
    let log = write_log(dir.path(), "hang.bin", "SLEEP", &[]);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let canceller = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(150));
        trigger.cancel();
    });
    let started = Instant::now();
    let err = decoder.decode(&log, &["ATT"], &cancel).unwrap_err();
    canceller.join().unwrap();
    assert!(err.is_cancelled());
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[test]
fn concurrent_comparisons_use_private_scratch_files() {
    let (dir, decoder) = setup();
    let mut requests = Vec::new();
    for i in 0..4 {
        let att = format!("TimeUS,Roll\n{},{}.0\n", 1_000 * (i + 1), i);
        let parm = format!("TimeUS,Name,Value\n1,RUN_ID,{i}\n");
        let log = write_log(
            dir.path(),
            &format!("run{i}.bin"),
            "BIN",
            &[("ATT", att.as_str()), ("PARM", parm.as_str())],
        );
        requests.push((i, log));
    }

    let comparator = Comparator::new(decoder);
    let baseline = requests[0].1.clone();
    std::thread::scope(|scope| {
        for (i, log) in &requests {
            let comparator = &comparator;
            let baseline = &baseline;
            scope.spawn(move || {
                let report = comparator
                    .compare(
                        &CompareRequest::new(baseline.clone(), log.clone()),
                        &CancellationToken::new(),
                    )
                    .unwrap();
                assert_eq!(report.series2.timestamps(), [1_000 * (*i as u64 + 1)]);
                assert_eq!(report.param_diff.is_empty(), *i == 0);
            });
        }
    });
}
