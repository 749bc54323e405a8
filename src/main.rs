use anyhow::{bail, Context};
use clap::Parser;
use geotag::{
    format_file_size, format_sexagesimal, to_decimal_degrees, Axis, Cli, Commands, Enrichment,
    GeoCoordinate, GeotagRecord, Hemisphere, IngestConfig, IngestionOrchestrator, JsonFileStore,
    Loader, MapView, MetadataProcessor, NominatimClient, SubmitOutcome,
};
use log::LevelFilter;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init();

    let config = match &cli.config {
        Some(path) => IngestConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => IngestConfig::default(),
    };

    match cli.command {
        Commands::Ingest {
            input,
            no_geocode,
            save,
            yes,
            endpoint,
            timeout,
        } => {
            let mut config = config;
            if no_geocode {
                config.enable_geocoding = false;
            }
            if let Some(endpoint) = endpoint {
                config.geocode_endpoint = endpoint;
            }
            if timeout.is_some() {
                config.geocode_timeout_secs = timeout;
            }
            config.validate()?;

            process_ingest(config, input, save, yes).await?;
        }
        Commands::Info { input } => {
            process_info(&config, &input).await?;
        }
        Commands::Convert {
            degrees,
            minutes,
            seconds,
            reference,
        } => {
            process_convert([degrees, minutes, seconds], reference);
        }
        Commands::Map { lat, lon } => {
            let state = lat.zip(lon);
            println!("{}", MapView::from_routed_state(state));
        }
    }

    Ok(())
}

async fn process_ingest(
    config: IngestConfig,
    input: PathBuf,
    save: Option<PathBuf>,
    yes: bool,
) -> anyhow::Result<()> {
    let geocoder = NominatimClient::new(&config)?;
    let orchestrator = IngestionOrchestrator::new(config, MetadataProcessor::new(), geocoder);

    let outcome = orchestrator
        .submit_file(&input)
        .await
        .with_context(|| format!("Failed to ingest {}", input.display()))?;
    let record = match outcome {
        SubmitOutcome::Completed(record) => record,
        SubmitOutcome::Superseded => bail!("Submission was superseded"),
    };

    print_record(&input, &record);

    let Some(path) = save else {
        return Ok(());
    };

    let review = orchestrator
        .submit_for_review()
        .await
        .context("Record cannot be saved")?;

    println!("\n{}", review.prompt());
    if yes || confirm()? {
        let mut store = JsonFileStore::new(&path);
        review.confirm(&mut store)?;
        println!("Record saved to: {}", path.display());
    } else {
        println!("Record discarded");
    }

    Ok(())
}

async fn process_info(config: &IngestConfig, input: &Path) -> anyhow::Result<()> {
    let loader = Loader::new().with_max_file_size(config.max_file_size);
    let image = loader
        .load_file(input)
        .await
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let tags = MetadataProcessor::new().read_tags(&image.bytes);

    println!("=== Image Information ===");
    println!("File: {}", input.display());
    println!("Size: {}", format_file_size(image.preview.byte_len as u64));
    println!("Format: {}", image.preview.mime_type);

    println!("\n=== Metadata Tags ===");
    println!("{:25}: {}", "GPS Latitude", components_text(tags.latitude));
    println!("{:25}: {}", "GPS Latitude Ref", optional_text(tags.latitude_ref));
    println!("{:25}: {}", "GPS Longitude", components_text(tags.longitude));
    println!("{:25}: {}", "GPS Longitude Ref", optional_text(tags.longitude_ref));
    println!(
        "{:25}: {}",
        "Original Date/Time",
        tags.date_time_original.as_deref().unwrap_or("absent")
    );

    if let Some(coordinate) = GeoCoordinate::from_tags(&tags, config.hemisphere_fallback) {
        println!("\nDecimal position: {}", coordinate);
    }

    Ok(())
}

fn process_convert(components: [f64; 3], reference: Hemisphere) {
    let decimal = to_decimal_degrees(components, reference);
    println!("{}", decimal);
    println!("{}", format_sexagesimal(decimal, reference.axis()));
}

fn print_record(input: &Path, record: &GeotagRecord) {
    println!("=== Geotag Record ===");
    println!("File:      {}", input.display());
    if let Some(preview) = record.preview() {
        println!(
            "Image:     {} ({})",
            preview.mime_type,
            format_file_size(preview.byte_len as u64)
        );
    }
    println!("Stage:     {}", record.stage());
    println!("Latitude:  {}", record.latitude_text());
    println!("Longitude: {}", record.longitude_text());
    if let Some(coordinate) = record.coordinate().present() {
        println!(
            "Position:  {}, {}",
            format_sexagesimal(coordinate.latitude(), Axis::Latitude),
            format_sexagesimal(coordinate.longitude(), Axis::Longitude)
        );
    }
    println!("Captured:  {}", record.capture_time_text());

    match record.place() {
        Enrichment::Found(place) => {
            println!("Place:     {}", place.display_name);
            for (key, value) in &place.address {
                println!("  {:18} {}", key, value);
            }
        }
        Enrichment::Failed(failure) => println!("Place:     {}", failure.message()),
        Enrichment::NotRequested => {}
    }

    println!("\n{}", MapView::from_record(record));
}

fn confirm() -> anyhow::Result<bool> {
    print!("Save? [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn components_text(components: Option<[f64; 3]>) -> String {
    match components {
        Some([d, m, s]) => format!("{} {} {}", d, m, s),
        None => "absent".to_string(),
    }
}

fn optional_text<T: std::fmt::Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "absent".to_string())
}
