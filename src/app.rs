use std::{
    io::{BufWriter, Write, stdout},
    path::PathBuf,
};

use crate::{
    common::error::AppError,
    domain::{cart::CartLedger, family::FamilyLedger, personal::PersonalLedger, sink::LedgerSink},
    io::{
        reader,
        store::{FileStore, SnapshotStore},
        writer,
    },
    worker::processor::Processor,
};

pub const STORE_DIR_ENV: &str = "LEDGER_STORE_DIR";
const DEFAULT_STORE_DIR: &str = ".ledger";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Book {
    Personal,
    Family,
}

impl Book {
    fn parse(s: Option<&String>) -> Result<Self, AppError> {
        match s.map(String::as_str) {
            None | Some("personal") => Ok(Book::Personal),
            Some("family") => Ok(Book::Family),
            Some(other) => Err(AppError::UnknownBook(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Summary(Book),
    Export(Book),
    Import(Book, PathBuf),
    ImportMembers(PathBuf),
    Members,
    Cart,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub store_dir: PathBuf,
    pub command: Command,
}

impl Config {
    /// Builds the run configuration from CLI arguments (program name first).
    /// The store directory comes from `--store DIR`, then `LEDGER_STORE_DIR`,
    /// then `.ledger`.
    pub fn from_args(args: Vec<String>, env_store_dir: Option<String>) -> Result<Self, AppError> {
        let mut rest: Vec<String> = Vec::new();
        let mut store_dir = env_store_dir.map(PathBuf::from);

        let mut iter = args.into_iter().skip(1);
        while let Some(arg) = iter.next() {
            if arg == "--store" {
                let dir = iter
                    .next()
                    .ok_or_else(|| AppError::Parse("--store needs a directory".into()))?;
                store_dir = Some(PathBuf::from(dir));
            } else {
                rest.push(arg);
            }
        }

        let command = match rest.first().map(String::as_str) {
            None => return Err(AppError::MissingArg),
            Some("summary") => Command::Summary(Book::parse(rest.get(1))?),
            Some("export") => Command::Export(Book::parse(rest.get(1))?),
            Some("import") => {
                let book = Book::parse(rest.get(1))?;
                let path = rest.get(2).ok_or(AppError::MissingArg)?;
                Command::Import(book, PathBuf::from(path))
            }
            Some("import-members") => {
                let path = rest.get(1).ok_or(AppError::MissingArg)?;
                Command::ImportMembers(PathBuf::from(path))
            }
            Some("members") => Command::Members,
            Some("cart") => Command::Cart,
            Some(other) => return Err(AppError::UnknownCommand(other.to_string())),
        };

        Ok(Config {
            store_dir: store_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_DIR)),
            command,
        })
    }
}

pub fn run<I, S>(args: I) -> Result<(), AppError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let args: Vec<String> = args.into_iter().map(|s| s.into()).collect();
    let config = Config::from_args(args, std::env::var(STORE_DIR_ENV).ok())?;
    let store = FileStore::open(&config.store_dir)?;
    tracing::debug!(store = %config.store_dir.display(), command = ?config.command, "starting");

    let stdout = stdout();
    let out = BufWriter::new(stdout.lock());
    execute(config.command, store, out)
}

/// Runs one command against `store`, writing CSV output to `out`.
pub fn execute<S, W>(command: Command, store: S, mut out: W) -> Result<(), AppError>
where
    S: SnapshotStore,
    W: Write,
{
    match command {
        Command::Summary(Book::Personal) => {
            let ledger = PersonalLedger::open(store)?;
            writer::write_summary(&mut out, &ledger.summary(), &ledger.category_breakdown())?;
        }
        Command::Summary(Book::Family) => {
            let ledger = FamilyLedger::open(store)?;
            writer::write_summary(&mut out, &ledger.summary(), &ledger.category_breakdown())?;
        }
        Command::Export(Book::Personal) => {
            let ledger = PersonalLedger::open(store)?;
            writer::write_transactions(&mut out, ledger.transactions(), &[])?;
        }
        Command::Export(Book::Family) => {
            let ledger = FamilyLedger::open(store)?;
            writer::write_transactions(&mut out, ledger.transactions(), ledger.members())?;
        }
        Command::Import(Book::Personal, path) => {
            let mut ledger = PersonalLedger::open(store)?;
            import_transactions(&mut ledger, &path)?;
        }
        Command::Import(Book::Family, path) => {
            let mut ledger = FamilyLedger::open(store)?;
            import_transactions(&mut ledger, &path)?;
        }
        Command::ImportMembers(path) => {
            let mut ledger = FamilyLedger::open(store)?;
            let mut rdr = csv_reader(&path)?;
            let mut processor = Processor::new();
            for event in reader::read_members(&mut rdr) {
                let event = event.map_err(AppError::Parse)?;
                processor.process(&mut ledger, event)?;
            }
            report(&processor);
        }
        Command::Members => {
            let ledger = FamilyLedger::open(store)?;
            writer::write_members(&mut out, ledger.members())?;
        }
        Command::Cart => {
            let ledger = CartLedger::open(store)?;
            writer::write_cart(&mut out, ledger.cart())?;
        }
    }
    out.flush()?;
    Ok(())
}

fn csv_reader(path: &PathBuf) -> Result<csv::Reader<std::fs::File>, AppError> {
    let file = std::fs::File::open(path)?;
    Ok(csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(file))
}

fn import_transactions<L: LedgerSink>(ledger: &mut L, path: &PathBuf) -> Result<(), AppError> {
    let mut rdr = csv_reader(path)?;
    let mut processor = Processor::new();
    for event in reader::read_transactions(&mut rdr) {
        let event = event.map_err(AppError::Parse)?;
        processor.process(ledger, event)?;
    }
    report(&processor);
    Ok(())
}

fn report(processor: &Processor) {
    let stats = processor.stats();
    if stats.rejected > 0 {
        tracing::warn!(
            applied = stats.applied,
            rejected = stats.rejected,
            "import finished with rejected rows"
        );
    } else {
        tracing::info!(applied = stats.applied, "import finished");
    }
}
