#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use gs_dump::{open_dump, Record};

/// Print the header and a record summary of a `.gs` or `.gs.lz4` dump.
#[derive(Debug, Parser)]
#[command(name = "gs-dump-inspect", version)]
struct Args {
    /// Dump file; `.gs.lz4` files are decompressed on the fly.
    path: PathBuf,

    /// Size in bytes of the register snapshot stored in the dump; it is not recorded in the file.
    #[arg(long)]
    regs_size: usize,

    /// Print one line per record.
    #[arg(long)]
    records: bool,
}

#[derive(Debug, Default)]
struct Summary {
    transfers: BTreeMap<u8, (u64, u64)>,
    fifo_reads: u64,
    fifo_bytes: u64,
    vsyncs: u64,
}

impl Summary {
    fn add(&mut self, record: &Record) {
        match record {
            Record::Transfer { index, data } => {
                let entry = self.transfers.entry(*index).or_default();
                entry.0 += 1;
                entry.1 += data.len() as u64;
            }
            Record::ReadFifo { size } => {
                self.fifo_reads += 1;
                self.fifo_bytes += u64::from(*size);
            }
            Record::Registers(_) => self.vsyncs += 1,
            Record::Field(_) => {}
        }
    }
}

fn describe(record: &Record) -> String {
    match record {
        Record::Transfer { index, data } => format!("transfer path={index} size={}", data.len()),
        Record::ReadFifo { size } => format!("readfifo size={size}"),
        Record::Registers(regs) => format!("vsync registers={} bytes", regs.len()),
        Record::Field(field) => format!("field {field}"),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut reader = open_dump(&args.path, args.regs_size)
        .with_context(|| format!("failed to open dump {}", args.path.display()))?;

    let header = reader.header();
    println!("crc: {:#010x}", header.crc);
    println!("freeze data: {} bytes", header.freeze_data.len());
    println!("registers: {} bytes", header.registers.len());

    let mut summary = Summary::default();
    let mut offset = 0u64;
    while let Some(record) = reader
        .next_record()
        .with_context(|| format!("failed to decode record #{offset}"))?
    {
        if args.records {
            println!("#{offset}: {}", describe(&record));
        }
        summary.add(&record);
        offset += 1;
    }
    tracing::debug!(records = offset, "finished reading dump");

    println!("records: {offset}");
    for (index, (count, bytes)) in &summary.transfers {
        println!("transfers[{index}]: {count} ({bytes} bytes)");
    }
    println!(
        "fifo reads: {} ({} bytes)",
        summary.fifo_reads, summary.fifo_bytes
    );
    println!("vsyncs: {}", summary.vsyncs);
    Ok(())
}
