#![cfg(not(target_arch = "wasm32"))]

use std::fs;
use std::path::Path;

use gs_dump::{open_dump, DumpConfig, DumpSession, Record};

const REGS: usize = 32;

fn regs(fill: u8) -> [u8; REGS] {
    [fill; REGS]
}

fn raw_session() -> DumpSession<REGS> {
    DumpSession::new(DumpConfig::raw())
}

fn read_records(path: &Path) -> Vec<Record> {
    open_dump(path, REGS)
        .unwrap()
        .collect::<gs_dump::Result<_>>()
        .unwrap()
}

#[test]
fn header_and_first_transfer_match_reference_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("capture");

    let mut session = raw_session();
    session.open(&base, 0x0000_1234, &[], &regs(0));
    assert!(session.is_open());
    session.transfer(3, b"ABCDE");
    session.close();

    let bytes = fs::read(dir.path().join("capture.gs")).unwrap();
    let mut expected = vec![0x34, 0x12, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
    expected.extend_from_slice(&[0u8; 32]);
    expected.extend_from_slice(&[0x00, 0x03, 0x05, 0x00, 0x00, 0x00, 0x41, 0x42, 0x43, 0x44, 0x45]);
    assert_eq!(bytes, expected);
}

#[test]
fn records_decode_in_call_order() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("order");

    let mut session = raw_session();
    session.open(&base, 7, b"freeze-state", &regs(1));
    session.transfer(0, &[0xAA; 300]);
    session.read_fifo(0x40);
    session.vsync(1, false, &regs(2));
    session.transfer(2, b"xyz");
    session.vsync(0, false, &regs(3));
    let path = session.path().unwrap().to_path_buf();
    session.close();

    let reader = open_dump(&path, REGS).unwrap();
    assert_eq!(reader.header().crc, 7);
    assert_eq!(reader.header().freeze_data, b"freeze-state");
    assert_eq!(reader.header().registers, regs(1));

    assert_eq!(
        read_records(&path),
        vec![
            Record::Transfer {
                index: 0,
                data: vec![0xAA; 300],
            },
            Record::ReadFifo { size: 0x40 },
            Record::Registers(regs(2).to_vec()),
            Record::Field(1),
            Record::Transfer {
                index: 2,
                data: b"xyz".to_vec(),
            },
            Record::Registers(regs(3).to_vec()),
            Record::Field(0),
        ]
    );
}

#[test]
fn zero_sized_records_append_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("empty");

    let mut session = raw_session();
    session.open(&base, 0, &[], &regs(0));
    session.transfer(1, &[]);
    session.read_fifo(0);
    session.close();

    let bytes = fs::read(dir.path().join("empty.gs")).unwrap();
    assert_eq!(bytes.len(), 8 + REGS);
}

#[test]
fn calls_after_close_do_not_touch_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("closed");
    let path = dir.path().join("closed.gs");

    let mut session = raw_session();
    session.open(&base, 0, &[], &regs(0));
    session.read_fifo(4);
    session.close();
    let before = fs::read(&path).unwrap();

    session.transfer(0, b"late");
    session.read_fifo(8);
    session.vsync(0, true, &regs(0));
    session.close();
    assert_eq!(fs::read(&path).unwrap(), before);

    fs::remove_file(&path).unwrap();
    session.transfer(0, b"late");
    session.close();
    assert!(!path.exists());
}

#[test]
fn fourth_last_vsync_closes_the_dump() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("gate");

    let mut session = raw_session();
    session.open(&base, 0, &[], &regs(0));
    for call in 1..=3u64 {
        session.vsync(0, true, &regs(call as u8));
        assert!(session.is_open(), "closed early on call {call}");
        assert_eq!(session.frame_count(), call);
    }
    assert_eq!(session.extra_frames(), -1);

    session.vsync(1, true, &regs(4));
    assert!(!session.is_open());
    assert_eq!(session.frame_count(), 4);
    assert_eq!(session.extra_frames(), -1);

    // The fifth vsync arrives after the auto-close and must not be recorded.
    session.vsync(0, true, &regs(5));
    assert_eq!(session.frame_count(), 4);

    let records = read_records(&dir.path().join("gate.gs"));
    assert_eq!(records.len(), 8);
    assert_eq!(records[6], Record::Registers(regs(4).to_vec()));
    assert_eq!(records[7], Record::Field(1));
}

#[test]
fn unwritable_destination_leaves_session_inert() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("missing").join("dir").join("capture");

    let mut session = raw_session();
    session.open(&base, 0x1234, b"fd", &regs(0));
    assert!(!session.is_open());
    assert!(session.path().is_none());

    session.transfer(3, b"ABCDE");
    session.read_fifo(5);
    session.vsync(0, true, &regs(0));
    session.close();
    assert!(!session.is_open());
    assert_eq!(session.frame_count(), 0);
    assert!(!dir.path().join("missing").exists());
}

#[test]
fn reopening_finalizes_the_previous_dump() {
    let dir = tempfile::tempdir().unwrap();

    let mut session = raw_session();
    session.open(dir.path().join("first"), 1, &[], &regs(0));
    session.vsync(0, true, &regs(0));
    session.read_fifo(12);
    assert_eq!(session.frame_count(), 1);

    session.open(dir.path().join("second"), 2, &[], &regs(0));
    assert_eq!(session.frame_count(), 0);
    assert_eq!(session.extra_frames(), 2);
    session.close();

    let first = read_records(&dir.path().join("first.gs"));
    assert_eq!(first.last(), Some(&Record::ReadFifo { size: 12 }));
    assert!(read_records(&dir.path().join("second.gs")).is_empty());
}

#[test]
fn existing_file_is_truncated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("again.gs");
    fs::write(&path, vec![0xFF; 4096]).unwrap();

    let mut session = raw_session();
    session.open(dir.path().join("again"), 0, &[], &regs(0));
    session.close();
    assert_eq!(fs::read(&path).unwrap().len(), 8 + REGS);
}

#[cfg(target_os = "linux")]
#[test]
fn write_failure_closes_the_session() {
    let dir = tempfile::tempdir().unwrap();
    std::os::unix::fs::symlink("/dev/full", dir.path().join("cap.gs")).unwrap();

    let mut session = raw_session();
    session.open(dir.path().join("cap"), 0, &[], &regs(0));
    assert!(session.is_open());

    // Larger than the file's write buffer, so the write reaches the device.
    session.transfer(0, &vec![0x33; 1024 * 1024]);
    assert!(!session.is_open());
    assert_eq!(session.pending_bytes(), 0);

    session.vsync(0, true, &regs(0));
    assert_eq!(session.frame_count(), 0);
    session.close();
    assert!(!session.is_open());
}
