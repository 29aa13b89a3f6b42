use clap::Parser;
use jutsu_scrape::{CrawlReport, Harvest, Jutsu};
use std::fs::File;
use std::io::{BufWriter, Write};

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();
    let output_path = args.output.clone();

    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            ::log::error!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    ::log::info!("Starting crawl of {}", config.start_url);

    // Start the crawler and get a session streaming records
    let mut session = match Harvest::new().with_config(config).run() {
        Ok(session) => session,
        Err(e) => {
            ::log::error!("Failed to start crawler: {}", e);
            std::process::exit(2);
        }
    };

    let file = match File::create(&output_path) {
        Ok(file) => file,
        Err(e) => {
            ::log::error!("Cannot create {}: {}", output_path.display(), e);
            std::process::exit(2);
        }
    };
    let mut writer = BufWriter::new(file);

    // Write records as they come in
    let start_time = std::time::Instant::now();
    let mut written = 0usize;
    let mut write_failed = false;

    while let Some(record) = session.next_record().await {
        if let Err(e) = write_record(&mut writer, &record) {
            ::log::error!("Failed to write record for {}: {}", record.name, e);
            write_failed = true;
            break;
        }
        written += 1;

        if written % 50 == 0 {
            ::log::info!("{} records written so far", written);
        }
    }

    let report = session.finish().await;

    if let Err(e) = writer.flush() {
        ::log::error!("Failed to flush {}: {}", output_path.display(), e);
        write_failed = true;
    }

    let duration = start_time.elapsed();
    ::log::info!(
        "Crawl complete in {:.2} seconds: {}",
        duration.as_secs_f64(),
        report
    );
    ::log::info!("Wrote {} records to {}", written, output_path.display());

    if let Some(err) = &report.walk_error {
        ::log::error!("Listing walk did not finish cleanly: {}", err);
    }

    let code = exit_code(&report, write_failed);
    if code != 0 {
        std::process::exit(code);
    }
}

/// Exit code for a finished run: nonzero when the walk halted or the
/// output file is incomplete
fn exit_code(report: &CrawlReport, write_failed: bool) -> i32 {
    if report.walk_error.is_some() || write_failed {
        1
    } else {
        0
    }
}

/// Serialize one record as a JSON line
fn write_record(writer: &mut impl Write, record: &Jutsu) -> std::io::Result<()> {
    let line = serde_json::to_string(record)?;
    writeln!(writer, "{}", line)
}
