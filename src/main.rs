//! Interactive CLI front-end for the upsell wizard.
//!
//! A stdin/stdout rendition of the flow for local runs: every screen a real
//! host would draw is a prompt here, and the controller does everything else.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use trip_extras::api::HttpApiClient;
use trip_extras::catalog::CategoryGroup;
use trip_extras::config::ApiConfig;
use trip_extras::session::{TransferChoice, TransferDetails};
use trip_extras::wizard::{Advance, Step, WizardController};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ApiConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  export TRIP_EXTRAS_BASE_URL=https://api.example.com/v1");
        eprintln!("  export TRIP_EXTRAS_API_TOKEN=...");
        std::process::exit(1);
    });

    eprintln!("✈️  Trip Extras v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: {}", config.base_url);
    eprintln!("   Answer the prompts to browse add-ons for your flight.\n");

    let api = Arc::new(HttpApiClient::new(config));
    let wizard = WizardController::new(api.clone(), api);

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        let step = wizard.current_step().await;
        match step {
            Step::Email => {
                let email = ask(&mut lines, "Email address").await?;
                wizard.set_email(&email).await;
                report(&wizard, wizard.advance().await).await;
            }
            Step::Flight => {
                let flight = ask(&mut lines, "Flight number (e.g. BA075)").await?;
                wizard.set_flight_number(&flight).await;
                report(&wizard, wizard.advance().await).await;
            }
            Step::TransferChoice => {
                let answer = ask(&mut lines, "Do you need an airport transfer? (y/n)").await?;
                match answer.to_lowercase().as_str() {
                    "y" | "yes" => wizard.choose_transfer(TransferChoice::Yes).await,
                    "n" | "no" => wizard.choose_transfer(TransferChoice::No).await,
                    _ => {}
                }
                report(&wizard, wizard.advance().await).await;
            }
            Step::TransferDetails => {
                let details = TransferDetails {
                    pickup_address: ask(&mut lines, "Pickup address").await?,
                    dropoff_address: ask(&mut lines, "Drop-off address").await?,
                    passenger_count: ask(&mut lines, "Passengers").await?,
                    pickup_date: ask(&mut lines, "Pickup date (YYYY-MM-DD)").await?,
                    pickup_time: ask(&mut lines, "Pickup time (HH:MM)").await?,
                    car_type: ask(&mut lines, "Car type (sedan/van/luxury)").await?,
                };
                wizard.set_transfer_details(details).await;
                report(&wizard, wizard.advance().await).await;
            }
            Step::CatalogBrowse => {
                print_catalog(&wizard.grouped_catalog().await);
                print_cart(&wizard).await;
                let line =
                    ask(&mut lines, "open <category> | pick <id> | review | quit").await?;
                match command(&line) {
                    ("open", Some(category)) => {
                        surface(wizard.open_category(category).await);
                    }
                    ("pick", Some(id)) => {
                        surface(wizard.toggle_ancillary(id).await.map(|_| ()));
                    }
                    ("review", _) => surface(wizard.request_review().await),
                    ("quit", _) => break,
                    _ => eprintln!("   Unknown command"),
                }
            }
            Step::CategoryDetail => {
                let session = wizard.session().await;
                let category = session.active_category.as_deref().unwrap_or_default();
                if let Some(group) = wizard
                    .grouped_catalog()
                    .await
                    .into_iter()
                    .find(|g| g.category == category)
                {
                    print_group(&group);
                }
                let line = ask(&mut lines, "pick <id> | back | review").await?;
                match command(&line) {
                    ("pick", Some(id)) => {
                        surface(wizard.toggle_ancillary(id).await.map(|_| ()));
                    }
                    ("back", _) => surface(wizard.close_category().await),
                    ("review", _) => surface(wizard.request_review().await),
                    _ => eprintln!("   Unknown command"),
                }
            }
            Step::Review => {
                print_review(&wizard).await;
                let line = ask(&mut lines, "buy | remove <id> | back").await?;
                match command(&line) {
                    ("buy", _) => surface(wizard.place_order().await),
                    ("remove", Some(id)) => {
                        surface(wizard.toggle_ancillary(id).await.map(|_| ()));
                    }
                    ("back", _) => surface(wizard.back_to_catalog().await),
                    _ => eprintln!("   Unknown command"),
                }
            }
            Step::Confirmed => {
                println!("\n🎉 Order confirmed! Enjoy your flight.\n");
                let answer = ask(&mut lines, "Book extras for another flight? (y/n)").await?;
                if matches!(answer.to_lowercase().as_str(), "y" | "yes") {
                    surface(wizard.start_over().await);
                } else {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Prompt and read one trimmed line; EOF ends the program.
async fn ask(
    lines: &mut Lines<BufReader<Stdin>>,
    prompt: &str,
) -> Result<String, std::io::Error> {
    eprint!("{prompt}> ");
    match lines.next_line().await? {
        Some(line) => Ok(line.trim().to_string()),
        None => {
            eprintln!();
            std::process::exit(0);
        }
    }
}

/// Split a command line into a verb and an optional argument.
fn command(line: &str) -> (&str, Option<&str>) {
    match line.split_once(' ') {
        Some((verb, rest)) => (verb, Some(rest.trim())),
        None => (line, None),
    }
}

/// Print the outcome of an advance: field errors stay on the session,
/// boundary failures surface as a single notification.
async fn report(
    wizard: &WizardController,
    outcome: Result<Advance, trip_extras::error::Error>,
) {
    match outcome {
        Ok(Advance::Moved(_)) => {}
        Ok(Advance::Rejected) => {
            for (field, message) in &wizard.session().await.validation_errors {
                eprintln!("   ✗ {field}: {message}");
            }
        }
        Err(e) => eprintln!("   ⚠️  {e} (please try again)"),
    }
}

/// Surface an action failure without ending the session.
fn surface(result: Result<(), trip_extras::error::Error>) {
    if let Err(e) = result {
        eprintln!("   ⚠️  {e}");
    }
}

fn print_catalog(groups: &[CategoryGroup]) {
    println!("\nRecommended for your flight:");
    for group in groups {
        println!("  [{}]", group.category);
        for item in &group.items {
            println!("    {}: {} ({})", item.id, item.name, item.price);
        }
    }
}

fn print_group(group: &CategoryGroup) {
    println!("\n[{}]", group.category);
    for item in &group.items {
        println!("  {}: {} ({})", item.id, item.name, item.price);
        if !item.description.is_empty() {
            println!("      {}", item.description);
        }
    }
}

async fn print_cart(wizard: &WizardController) {
    let session = wizard.session().await;
    if !session.selected.is_empty() {
        let ids: Vec<&str> = session.selected.iter().map(String::as_str).collect();
        println!("  In cart: {} (total {})", ids.join(", "), wizard.total().await);
    }
}

async fn print_review(wizard: &WizardController) {
    let session = wizard.session().await;
    let catalog = wizard.catalog().await;
    println!("\nYour selection:");
    for id in &session.selected {
        if let Some(item) = catalog.as_ref().and_then(|c| c.get(id)) {
            println!("  {}: {} ({})", item.id, item.name, item.price);
        }
    }
    println!("  Total: {}", wizard.total().await);
}
