//! End-to-end ingest scenarios driven through `Core::start_with_source`
//! against a `FixtureLineSource`, with assertions made by opening the
//! resulting store file directly (the in-crate `conn_for_test` helper is
//! `cfg(test)`-gated to `adcp_core` itself and isn't visible from here).

use std::path::Path;
use std::time::Duration;

use adcp_core::config::Config;
use adcp_core::transport::{AsyncLineSource, FixtureLineSource};
use adcp_core::Core;
use rusqlite::Connection;

fn store_conn(output_dir: &Path) -> Connection {
    Connection::open(output_dir.join("store.db")).expect("store.db should exist after a run")
}

fn count(conn: &Connection, sql: &str) -> i64 {
    conn.query_row(sql, [], |row| row.get(0)).unwrap()
}

async fn run_lines(lines: Vec<Vec<u8>>) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        output_dir: dir.path().to_path_buf(),
        batch_size: 1,
        batch_interval_ms: 10,
        cancel_deadline: Duration::from_secs(2),
        ..Config::default()
    };

    let mut core = Core::new(config);
    let source: Box<dyn AsyncLineSource> = Box::new(FixtureLineSource::new(lines));
    core.start_with_source(source).await.unwrap();

    tokio::time::sleep(Duration::from_millis(150)).await;
    core.stop().await;
    dir
}

fn sentence(payload: &str) -> Vec<u8> {
    let cs = nmea_proto::checksum::checksum(payload.as_bytes());
    let hex = nmea_proto::checksum::format_checksum(cs);
    let mut line = format!("${payload}*").into_bytes();
    line.extend_from_slice(&hex);
    line
}

#[tokio::test]
async fn config_then_sensor_produces_one_pnori_row_and_one_pnors_row() {
    // The checksums quoted alongside these sentences are illustrative, not
    // the real XOR of the payload, so the harness computes its own.
    let lines = vec![
        sentence("PNORI,4,Signature1000900001,4,20,0.20,1.00,0"),
        sentence("PNORS,102115,090715,00000000,2A480000,14.4,1523.0,275.9,15.7,2.3,0.000,22.45,0,0"),
    ];
    let dir = run_lines(lines).await;
    let conn = store_conn(dir.path());

    assert_eq!(count(&conn, "SELECT COUNT(*) FROM pnori"), 1);
    let (instrument_type, num_cells, coord): (i64, i64, String) = conn
        .query_row("SELECT instrument_type, num_cells, coord_system FROM pnori", [], |r| {
            Ok((r.get(0)?, r.get(1)?, r.get(2)?))
        })
        .unwrap();
    assert_eq!(instrument_type, 4);
    assert_eq!(num_cells, 20);
    assert_eq!(coord, "Enu");

    assert_eq!(count(&conn, "SELECT COUNT(*) FROM pnors_base"), 1);
    let (heading, temperature): (f64, f64) = conn
        .query_row("SELECT heading_deg, temperature_c FROM pnors_base", [], |r| Ok((r.get(0)?, r.get(1)?)))
        .unwrap();
    assert_eq!(heading, 275.9);
    assert_eq!(temperature, 22.45);

    assert_eq!(count(&conn, "SELECT COUNT(*) FROM parse_errors"), 0);
}

#[tokio::test]
async fn bad_checksum_is_recorded_as_checksum_mismatch() {
    // Spec scenario 2's literal "*XX" is non-hex and so hits CHECKSUM_MALFORMED
    // under this framer's own rules (see framer.rs's non_hex_stated_checksum
    // test); exercising the mismatch path needs a stated checksum that is
    // valid hex but still wrong, so the last digit is flipped instead.
    let mut line = sentence("PNORC,102115,090715,1,12.34,56.78,90.12");
    let n = line.len();
    line[n - 1] = if line[n - 1] == b'0' { b'1' } else { b'0' };

    let dir = run_lines(vec![line]).await;
    let conn = store_conn(dir.path());

    assert_eq!(count(&conn, "SELECT COUNT(*) FROM parse_errors"), 1);
    let kind: String = conn.query_row("SELECT error_kind FROM parse_errors", [], |r| r.get(0)).unwrap();
    assert_eq!(kind, "CHECKSUM_MISMATCH");
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM pnorc"), 0);
}

#[tokio::test]
async fn tagged_sensor_sentence_parses_into_pnors2() {
    let lines = vec![sentence(
        "PNORS2,DATE=083013,TIME=132455,EC=0,SC=34000034,BV=22.9,SS=1500.0,HSD=0.02,H=123.4,PI=45.6,PISD=0.02,R=23.4,RSD=0.02,P=123.456,PSD=0.02,T=24.56",
    )];
    let dir = run_lines(lines).await;
    let conn = store_conn(dir.path());

    assert_eq!(count(&conn, "SELECT COUNT(*) FROM pnors2"), 1);
    let (heading, heading_sd): (f64, f64) =
        conn.query_row("SELECT heading_deg, heading_sd FROM pnors2", [], |r| Ok((r.get(0)?, r.get(1)?))).unwrap();
    assert_eq!(heading, 123.4);
    assert_eq!(heading_sd, 0.02);
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM parse_errors"), 0);
}

#[tokio::test]
async fn signature_instrument_requires_four_beams() {
    let line = sentence("PNORI,4,X,3,20,0.20,1.00,0");
    let dir = run_lines(vec![line]).await;
    let conn = store_conn(dir.path());

    assert_eq!(count(&conn, "SELECT COUNT(*) FROM parse_errors"), 1);
    let kind: String = conn.query_row("SELECT error_kind FROM parse_errors", [], |r| r.get(0)).unwrap();
    assert_eq!(kind, "FIELD_RANGE");
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM pnori"), 0);
}

#[tokio::test]
async fn noise_burst_enters_and_exits_binary_mode_around_a_clean_header() {
    let noise = vec![0xA5u8; 200];
    // The resync scan needs >= 45 clean bytes after the "$PNOR" needle before
    // it trusts the candidate; the header alone is only 32 bytes past that
    // point, so pad with clean ASCII the way more trailing serial traffic
    // would. The padding sits after the checksum, so frame_line never sees it.
    let mut header = sentence("PNORH4,141112,083149,0000,2A4C0000");
    header.extend(std::iter::repeat(b'A').take(20));

    let dir = run_lines(vec![noise, header]).await;
    let conn = store_conn(dir.path());

    assert_eq!(count(&conn, "SELECT COUNT(*) FROM raw_lines WHERE outcome = 'binary'"), 2);
    assert_eq!(
        count(&conn, "SELECT COUNT(*) FROM parse_errors WHERE error_kind = 'BINARY_MODE_ENTRY'"),
        1
    );
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM parse_errors WHERE error_kind = 'BINARY_MODE_EXIT'"), 1);
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM pnorh"), 1);

    let blob_dir = dir.path().join("errors").join("binary");
    let blobs: Vec<_> = std::fs::read_dir(&blob_dir).unwrap().collect::<Result<_, _>>().unwrap();
    assert_eq!(blobs.len(), 1);
    let meta = std::fs::metadata(blobs[0].path()).unwrap();
    assert_eq!(meta.len(), 200);
}

#[tokio::test]
async fn two_frames_with_no_terminator_between_them_both_land_as_rows() {
    // Framing never relies on CR/LF (spec §4.1), so a single transport
    // chunk holding two back-to-back "$...*HH" frames must still yield
    // two rows, not one.
    let mut line = sentence("PNORWD,1.0,2.0,3.0,4.0");
    line.extend(sentence("PNORWD,5.0,6.0,7.0,8.0"));

    let dir = run_lines(vec![line]).await;
    let conn = store_conn(dir.path());

    assert_eq!(count(&conn, "SELECT COUNT(*) FROM pnorwd"), 2);
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM parse_errors"), 0);
}

#[tokio::test]
async fn queue_drop_head_keeps_only_the_latest_capacity_frames() {
    use adcp_core::queue::DropHeadQueue;
    use adcp_core::producer::QueueItem;
    use adcp_core::transport::RawRead;

    let queue: DropHeadQueue<QueueItem> = DropHeadQueue::new(1000);
    for i in 0..1500u32 {
        queue
            .push(QueueItem { received_at_ms: i as i64, raw: RawRead { bytes: i.to_be_bytes().to_vec(), truncated: false } })
            .await;
    }

    assert_eq!(queue.dropped(), 500);
    assert_eq!(queue.depth(), 1000);

    let drained = queue.drain().await;
    let received_at: Vec<i64> = drained.iter().map(|item| item.received_at_ms).collect();
    let expected: Vec<i64> = (500..1500).collect();
    assert_eq!(received_at, expected);
}
