use clap::Parser;
use geo_pages::resolve::structured::service_json_ld;
use geo_pages::utils::error::ErrorSeverity;
use geo_pages::utils::logger;
use geo_pages::{DocumentStore, LocalStorage, PageResolver, PagesError};

#[derive(Parser)]
#[command(name = "resolve-page")]
#[command(about = "Resolve a service page for one location and print the render model")]
struct Args {
    /// Service slug
    service: String,

    /// Location slug
    location: String,

    /// Directory holding the JSON collections
    #[arg(short, long, default_value = "./content")]
    store: String,

    /// Print only the schema.org JSON-LD
    #[arg(long)]
    json_ld: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let resolver = PageResolver::new(DocumentStore::new(LocalStorage::new(&args.store)));

    let model = match resolver.resolve(&args.service, &args.location).await {
        Ok(model) => model,
        Err(e @ PagesError::NotFound { .. }) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(4);
        }
        Err(e) => {
            tracing::error!("❌ Resolution failed: {} (Category: {:?})", e, e.category());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            let code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(code);
        }
    };

    let json_ld = service_json_ld(&model);
    let output = if args.json_ld {
        json_ld
    } else {
        serde_json::json!({
            "renderModel": model,
            "jsonLd": json_ld,
        })
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
