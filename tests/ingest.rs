mod common;

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use common::{TestWorkspace, fixture_bytes};
use tabular_digest::{
    ErrorClass, FileStore, FormatIssue, IngestError, Ingestor, RawFile, Strategy, Table,
    spreadsheet::{SpreadsheetError, SpreadsheetReader, UnavailableReader},
};

/// Returns a fixed table and counts how often it was asked.
struct FakeReader {
    calls: Arc<AtomicUsize>,
    result: Result<Table, SpreadsheetError>,
}

impl SpreadsheetReader for FakeReader {
    fn read_table(&self, _bytes: &[u8]) -> Result<Table, SpreadsheetError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

fn fake(result: Result<Table, SpreadsheetError>) -> (Ingestor, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let reader = FakeReader {
        calls: Arc::clone(&calls),
        result,
    };
    (Ingestor::default().with_spreadsheet_reader(Box::new(reader)), calls)
}

fn sheet() -> Table {
    Table::new(
        vec!["region".to_string(), "sales".to_string()],
        vec![vec![Some("north".to_string()), Some("12".to_string())]],
    )
    .expect("table")
}

#[test]
fn xlsx_uploads_bypass_the_csv_cascade() {
    let (ingestor, calls) = fake(Ok(sheet()));
    // Would decode fine as CSV; routing must still go to the spreadsheet reader.
    let ingested = ingestor
        .ingest(&RawFile::new("Report.XLSX", "a;b\n1;2\n"))
        .expect("ingest");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(ingested.table, sheet());
    let outcome = &ingested.outcome;
    assert_eq!(outcome.strategy, Strategy::Spreadsheet);
    assert!(outcome.detected_encoding.is_none());
    assert!(outcome.detected_delimiter.is_none());
    assert!(outcome.failures.is_empty());
}

#[test]
fn csv_uploads_never_reach_the_spreadsheet_reader() {
    let (ingestor, calls) = fake(Ok(sheet()));
    ingestor
        .ingest(&RawFile::new("people.csv", fixture_bytes("people_semicolon.csv")))
        .expect("ingest");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn unknown_extensions_are_rejected_as_invalid_input() {
    let (ingestor, calls) = fake(Ok(sheet()));
    let err = ingestor
        .ingest(&RawFile::new("notes.txt", "a,b\n1,2\n"))
        .unwrap_err();
    assert!(matches!(
        err,
        IngestError::UnsupportedFormat {
            issue: FormatIssue::Extension(ref ext),
            ..
        } if ext == "txt"
    ));
    assert_eq!(err.class(), ErrorClass::InvalidInput);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn missing_spreadsheet_support_is_a_configuration_error() {
    let ingestor = Ingestor::default().with_spreadsheet_reader(Box::new(UnavailableReader));
    let err = ingestor
        .ingest(&RawFile::new("book.xls", b"\xD0\xCF\x11\xE0".to_vec()))
        .unwrap_err();
    assert!(matches!(
        err,
        IngestError::UnsupportedFormat {
            issue: FormatIssue::MissingCapability(_),
            ..
        }
    ));
    assert_eq!(err.class(), ErrorClass::Configuration);
    assert_eq!(err.class().exit_code(), 4);
}

#[test]
fn spreadsheet_failures_keep_their_kind() {
    let (ingestor, _) = fake(Err(SpreadsheetError::Empty));
    let err = ingestor.ingest(&RawFile::new("empty.xlsx", Vec::<u8>::new())).unwrap_err();
    assert!(matches!(err, IngestError::EmptyFile { .. }));

    let (ingestor, _) = fake(Err(SpreadsheetError::Read("corrupt zip".to_string())));
    let err = ingestor.ingest(&RawFile::new("bad.xlsx", Vec::<u8>::new())).unwrap_err();
    assert!(matches!(err, IngestError::Spreadsheet { ref message, .. } if message == "corrupt zip"));
    assert_eq!(err.class(), ErrorClass::InvalidInput);
}

#[test]
fn load_reads_through_the_store() {
    let workspace = TestWorkspace::new();
    let store = workspace.store();
    let stored = store
        .save(&fixture_bytes("people_semicolon.csv"), "people.csv")
        .expect("save");
    let ingested = Ingestor::default().load(&store, &stored).expect("load");
    assert_eq!(ingested.table.row_count(), 2);
}

#[test]
fn load_of_unknown_name_is_not_found() {
    let workspace = TestWorkspace::new();
    let err = Ingestor::default()
        .load(&workspace.store(), "nope.csv")
        .unwrap_err();
    assert!(matches!(err, IngestError::NotFound { ref file } if file == "nope.csv"));
    assert_eq!(err.class(), ErrorClass::NotFound);
}
