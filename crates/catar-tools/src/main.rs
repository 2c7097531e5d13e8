use anyhow::Context;
use catar::{archiver, codec, walk, EntryKind};
use clap::{arg, ArgMatches, Command};
use colorize::AnsiColor;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::{
    fs::File,
    io::{stdout, BufWriter, Write},
    path::PathBuf,
};

fn cli() -> Command {
    Command::new("catar-tools")
        .about("Tools for creating and reading CATAR archives")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("pack")
                .about("Pack files and directories into a CATAR")
                .arg(arg!(archive_path: <ARCHIVE>))
                .arg(arg!(paths: <PATH> ... "files or directories to archive")),
        )
        .subcommand(
            Command::new("unpack")
                .about("Unpack a CATAR into a directory")
                .arg(arg!(archive_path: <ARCHIVE>))
                .arg(arg!(-o --out [OUT] "target directory, created if missing")),
        )
        .subcommand(
            Command::new("list")
                .about("List entries in a CATAR")
                .arg(arg!(archive_path: <ARCHIVE>))
                .arg(arg!(-j --json))
                .arg(arg!(-p --pretty)),
        )
}

fn main() {
    if let Err(e) = run() {
        eprintln!("FATAL: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    match cli().get_matches().subcommand() {
        Some(("pack", sub_matches)) => pack(sub_matches),
        Some(("unpack", sub_matches)) => unpack(sub_matches),
        Some(("list", sub_matches)) => list(sub_matches),
        _ => unreachable!(),
    }
}

fn pack(sub_matches: &ArgMatches) -> anyhow::Result<()> {
    let arc_path = archive_path(sub_matches);
    let paths: Vec<String> = sub_matches
        .get_many::<String>("paths")
        .expect("Couldn't get paths from args")
        .cloned()
        .collect();

    // Pre-scan the inputs so the byte bar has a total to count against.
    let spinner = ProgressBar::new_spinner();
    let mut total = 0;
    for path in &paths {
        for entry in walkdir::WalkDir::new(path)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            spinner.inc(1);
            if entry.file_type().is_file() {
                if let Ok(meta) = entry.metadata() {
                    total += meta.len();
                }
            }
        }
    }
    spinner.finish_and_clear();

    let catalog = walk::catalog_from_paths(&paths)
        .with_context(|| format!("couldn't catalog {} input path(s)", paths.len()))?;

    let bar = ProgressBar::new(total).with_style(ProgressStyle::with_template(
        "[{elapsed_precise}] {wide_bar} {bytes}/{total_bytes} ({percent}%)",
    )?);
    let file = File::create(&arc_path)
        .with_context(|| format!("couldn't create archive [{}]", arc_path.display()))?;
    let mut w = ProgressTrackingWriter(BufWriter::new(file), &bar);
    codec::encode(&mut w, &catalog)
        .with_context(|| format!("couldn't pack [{}]", arc_path.display()))?;
    w.flush()?;
    bar.finish_and_clear();

    println!(
        "{}: {} entries, {} file(s)",
        arc_path.display(),
        catalog.len(),
        catalog.files().count()
    );
    Ok(())
}

fn unpack(sub_matches: &ArgMatches) -> anyhow::Result<()> {
    let arc_path = archive_path(sub_matches);
    let out = sub_matches
        .get_one::<String>("out")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    std::fs::create_dir_all(&out)
        .with_context(|| format!("couldn't create directory [{}]", out.display()))?;
    archiver::unpack(&arc_path, &out)
        .with_context(|| format!("couldn't unpack [{}]", arc_path.display()))?;
    Ok(())
}

fn list(sub_matches: &ArgMatches) -> anyhow::Result<()> {
    let arc_path = archive_path(sub_matches);
    let catalog = archiver::list(&arc_path)
        .with_context(|| format!("couldn't read catalog of [{}]", arc_path.display()))?;

    if sub_matches.get_flag("json") {
        let entries: Vec<ListEntry> = catalog
            .entries()
            .iter()
            .map(|e| ListEntry {
                name: &e.name,
                _type: e.kind,
            })
            .collect();
        if sub_matches.get_flag("pretty") {
            serde_json::to_writer_pretty(stdout().lock(), &entries)?;
        } else {
            serde_json::to_writer(stdout().lock(), &entries)?;
        }
        println!();
    } else {
        for entry in catalog.entries() {
            if entry.is_directory() {
                println!("{}", entry.name.clone().blue().bold());
            } else {
                println!("{}", entry.name);
            }
        }
    }
    Ok(())
}

fn archive_path(sub_matches: &ArgMatches) -> PathBuf {
    PathBuf::from(
        sub_matches
            .get_one::<String>("archive_path")
            .expect("Couldn't get archive path from args"),
    )
}

#[derive(Debug, Serialize)]
struct ListEntry<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    _type: EntryKind,
}

struct ProgressTrackingWriter<'a, W>(W, &'a ProgressBar);
impl<'a, W: Write> Write for ProgressTrackingWriter<'a, W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let written = self.0.write(buf)?;
        self.1.inc(written as u64);
        Ok(written)
    }
    fn flush(&mut self) -> std::io::Result<()> {
        self.0.flush()
    }
}
