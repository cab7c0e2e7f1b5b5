use tabular_digest::IngestError;

fn main() {
    if let Err(err) = tabular_digest::run() {
        eprintln!("error: {err:#}");
        let code = err
            .downcast_ref::<IngestError>()
            .map_or(1, |ingest| ingest.class().exit_code());
        std::process::exit(code);
    }
}
