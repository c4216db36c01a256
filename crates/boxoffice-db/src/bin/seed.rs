//! # Seed Data Generator
//!
//! Populates the database with a demo event for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default demo event (25 manual guests)
//! cargo run -p boxoffice-db --bin seed
//!
//! # Generate a custom guest count
//! cargo run -p boxoffice-db --bin seed -- --guests 40
//!
//! # Specify database path
//! cargo run -p boxoffice-db --bin seed -- --db ./data/boxoffice.db
//! ```
//!
//! ## Generated Data
//! One event (capacity 50) with everything around it:
//! - Three ticket types covering the window shapes: a closed early-bird
//!   window, an open-ended regular window, and a fully derived one
//! - The default user fields plus a dietary-wishes question
//! - Manual guests, plus reservations in every lifecycle state
//! - A couple of waiting-list registrations

use chrono::{Duration, Utc};
use std::env;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use boxoffice_core::{
    Attendee, Event, Money, Reservation, Ticket, UserField, UserFieldType,
    WaitingListRegistration,
};
use boxoffice_db::{Database, DbConfig};

/// Name pool for generated guests
const FIRST_NAMES: &[&str] = &[
    "Ada", "Grace", "Alan", "Edsger", "Barbara", "Donald", "Margaret", "John", "Frances",
    "Dennis", "Radia", "Ken", "Adele", "Bjarne", "Katherine", "Linus", "Annie", "Tim",
    "Hedy", "Niklaus",
];

/// Surname pool for generated guests
const SURNAMES: &[&str] = &[
    "Lovelace", "Hopper", "Turing", "Dijkstra", "Liskov", "Knuth", "Hamilton", "Backus",
    "Allen", "Ritchie", "Perlman", "Thompson", "Goldberg", "Stroustrup", "Johnson",
    "Torvalds", "Easley", "Berners-Lee", "Lamarr", "Wirth",
];

/// Dietary answers; the first entry means "leave the field blank"
const DIETS: &[&str] = &["", "vegetarian", "vegan", "gluten-free", "halal"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut guests: usize = 25;
    let mut db_path = String::from("./boxoffice_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--guests" | "-g" => {
                if i + 1 < args.len() {
                    guests = args[i + 1].parse().unwrap_or(25);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Boxoffice Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -g, --guests <N>   Number of manual guests to generate (default: 25)");
                println!("  -d, --db <PATH>    Database file path (default: ./boxoffice_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🎟  Boxoffice Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!("Guests:   {}", guests);
    println!();

    // Connect to database
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing events
    let existing = db.events().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} event(s)", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Creating demo event...");

    let mut event = Event::new();
    event.success_message = Some("Thanks! Your tickets are on their way.".to_string());
    event.printed_ticket_content = Some("Doors open one hour before the show.".to_string());
    db.events().create(&event).await?;
    println!("  Event {} (capacity {})", event.id, event.capacity);

    // Ticket types covering all three window shapes
    let now = Utc::now();

    let mut early_bird = Ticket::new(&event.id, "Early bird", Money::from_cents(1500));
    early_bird.available_from = Some(now - Duration::days(30));
    early_bird.available_till = Some(now - Duration::days(7));
    early_bird.sort = 0;

    let mut regular = Ticket::new(&event.id, "Regular", Money::from_cents(2500));
    regular.available_from = Some(now - Duration::days(7));
    regular.sort = 1;

    let mut vip = Ticket::new(&event.id, "VIP", Money::from_cents(7500));
    vip.order_max = 2;
    vip.sort = 2;

    for ticket in [&early_bird, &regular, &vip] {
        db.tickets().create(ticket).await?;
        println!("  Ticket \"{}\" ({})", ticket.title, ticket.price());
    }

    // Default form fields plus one extra question
    let defaults = vec![
        UserField::new(&event.id, "FirstName", "First name", UserFieldType::Text)
            .required()
            .at(0),
        UserField::new(&event.id, "Surname", "Surname", UserFieldType::Text)
            .required()
            .at(1),
        UserField::new(&event.id, "Email", "Email address", UserFieldType::Email)
            .required()
            .at(2),
    ];
    db.user_fields().ensure_defaults(&event.id, &defaults).await?;
    let diet = UserField::new(&event.id, "DietaryWishes", "Dietary wishes", UserFieldType::Text)
        .at(3);
    db.user_fields().create(&diet).await?;
    println!("  User fields seeded");

    // Manual guests
    println!();
    println!("Generating guests...");

    let mut generated = 0;
    for seed in 0..guests {
        let attendee = generate_guest(&event.id, seed);
        if let Err(e) = db.attendees().create(&attendee).await {
            eprintln!("Failed to insert guest {}: {}", attendee.full_name(), e);
            continue;
        }
        generated += 1;

        if generated % 10 == 0 {
            println!("  Generated {} guests...", generated);
        }
    }

    // Check the first few in, like a door scan in progress
    let guest_list = db.attendees().guest_list(&event.id).await?;
    for attendee in guest_list.iter().take(3) {
        db.attendees().check_in(&attendee.id).await?;
    }

    // Reservations in every lifecycle state
    println!();
    println!("Creating reservations...");

    seed_reservation(&db, &event, &regular, 2, "paid").await?;
    seed_reservation(&db, &event, &regular, 1, "pending").await?;
    seed_reservation(&db, &event, &early_bird, 1, "cancelled").await?;
    seed_reservation(&db, &event, &vip, 1, "expired").await?;
    println!("  One reservation per lifecycle state (paid holds 2 seats)");

    // Waiting list
    for (first, last) in [("Evelyn", "Boyd"), ("Mary", "Jackson")] {
        let mut registration =
            WaitingListRegistration::new(&event.id, first, last, &demo_email(first, last));
        if first == "Mary" {
            registration.telephone = Some("+31 20 555 0199".to_string());
        }
        db.waiting_list().create(&registration).await?;
    }
    println!("  2 waiting-list registrations");

    // Summary
    let guest_count = db.attendees().guest_count(&event.id).await?;
    let checked_in = db.attendees().checked_in_count(&event.id).await?;

    println!();
    println!("✓ Seed complete!");
    println!("  Guest list:  {}/{}", guest_count, event.capacity);
    println!("  Checked in:  {}", checked_in);
    println!("  Event ID:    {}", event.id);

    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=boxoffice=trace` - Show trace for boxoffice crates only
/// - Default: INFO level
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,boxoffice=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::TRACE)
        .init();
}

/// Generates a single manual guest with deterministic pseudo-random data.
fn generate_guest(event_id: &str, seed: usize) -> Attendee {
    let first = FIRST_NAMES[seed % FIRST_NAMES.len()];
    let last = SURNAMES[(seed * 7 + 3) % SURNAMES.len()];

    let mut attendee = Attendee::new(event_id, first, last, demo_email(first, last));

    let diet = DIETS[seed % DIETS.len()];
    if !diet.is_empty() {
        attendee
            .extra
            .insert("DietaryWishes".to_string(), diet.to_string());
    }

    attendee
}

/// Builds a demo email address from a name.
fn demo_email(first: &str, last: &str) -> String {
    format!(
        "{}.{}@example.com",
        first.to_lowercase(),
        last.to_lowercase().replace([' ', '-'], "")
    )
}

/// Creates a reservation holding `seats` attendees and drives it into the
/// requested lifecycle state.
async fn seed_reservation(
    db: &Database,
    event: &Event,
    ticket: &Ticket,
    seats: usize,
    status: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let reservation = Reservation::new(&event.id);
    db.reservations().create(&reservation).await?;

    for seat in 0..seats {
        let seed = seat + ticket.sort as usize * 31 + seats * 13;
        let first = FIRST_NAMES[(seed * 11 + 5) % FIRST_NAMES.len()];
        let last = SURNAMES[(seed * 13 + 1) % SURNAMES.len()];
        let attendee = Attendee::new(&event.id, first, last, demo_email(first, last))
            .with_reservation(&reservation.id, &ticket.id);
        db.attendees().create(&attendee).await?;
    }

    let total = ticket.price() * (seats as i64);
    db.reservations()
        .update_total(&reservation.id, total.cents())
        .await?;

    match status {
        "pending" => {}
        "paid" => db.reservations().mark_paid(&reservation.id).await?,
        "cancelled" => db.reservations().mark_cancelled(&reservation.id).await?,
        "expired" => db.reservations().mark_expired(&reservation.id).await?,
        other => return Err(format!("unknown reservation status: {other}").into()),
    }

    Ok(())
}
