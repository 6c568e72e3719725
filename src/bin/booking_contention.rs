//! Booking contention check
//!
//! Fires N concurrent single-seat bookings at one event of capacity C and
//! verifies that exactly min(N, C) succeed.
//!
//! Run with: cargo run --bin booking_contention --release -- --bookings 500 --capacity 50
//! Add `--postgres` to run against DATABASE_URL instead of memory.

use std::sync::Arc;
use std::time::Instant;

use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use ticket_desk::aggregate::Aggregate;
use ticket_desk::domain::{Caller, ErrorKind, OperationContext};
use ticket_desk::handlers::{
    BookingLedger, CreateBookingCommand, CreateEventCommand, EventRegistry, RegisterUserCommand,
    UserDirectory,
};
use ticket_desk::store::{MemoryStore, PostgresStore, Store};

fn arg_value(args: &[String], flag: &str, default: u32) -> u32 {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    let bookings = arg_value(&args, "--bookings", 200);
    let capacity = arg_value(&args, "--capacity", 20).max(1);

    let store: Arc<dyn Store> = if args.iter().any(|a| a == "--postgres") {
        let database_url = std::env::var("DATABASE_URL")?;
        println!("Connecting to database...");
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .connect(&database_url)
            .await?;
        Arc::new(PostgresStore::new(pool))
    } else {
        Arc::new(MemoryStore::new())
    };

    println!(
        "Booking contention - {} bookings against capacity {} ({} store)",
        bookings,
        capacity,
        store.backend()
    );

    let users = UserDirectory::new(store.clone());
    let registry = EventRegistry::new(store.clone());
    let ledger = BookingLedger::new(store.clone());

    let run = Uuid::new_v4().simple().to_string();
    let admin_id = Uuid::new_v4();
    users
        .ensure_admin(
            admin_id,
            "Contention Admin",
            &format!("admin-{}@contention.test", run),
            "9000000000",
        )
        .await?;
    let admin = OperationContext::new().with_caller(Caller::admin(admin_id));

    let event = registry
        .create_event(
            CreateEventCommand::new(
                format!("Contention {}", &run[..8]),
                "Concurrent booking check",
                "2030-01-01",
                "20:00",
                i64::from(capacity),
                Decimal::ONE,
            ),
            &admin,
        )
        .await?;

    let mut callers = Vec::with_capacity(bookings as usize);
    for i in 0..bookings {
        let user = users
            .register_user(
                RegisterUserCommand::new(
                    format!("Contender {}", i),
                    format!("contender-{}-{}@contention.test", run, i),
                    "9111111111",
                ),
                &OperationContext::new(),
            )
            .await?;
        callers.push(user.id());
    }

    let start = Instant::now();
    let mut tasks = Vec::with_capacity(callers.len());
    for (i, user_id) in callers.into_iter().enumerate() {
        let ledger = ledger.clone();
        let context = OperationContext::new().with_caller(Caller::user(user_id));
        let command = CreateBookingCommand::new(user_id, event.id(), [format!("S{}", i)]);
        tasks.push(tokio::spawn(async move {
            ledger.create_booking(command, &context).await
        }));
    }

    let mut succeeded = 0u32;
    let mut rejected = 0u32;
    let mut other_failures = 0u32;
    for task in tasks {
        match task.await? {
            Ok(_) => succeeded += 1,
            Err(e) if e.kind() == Some(ErrorKind::Capacity) => rejected += 1,
            Err(e) => {
                eprintln!("Unexpected failure: {}", e);
                other_failures += 1;
            }
        }
    }
    let elapsed = start.elapsed();

    let booked = registry.get_event(event.id()).await?.booked_count();
    let expected = bookings.min(capacity);

    println!("\n=== Contention Results ===");
    println!("Succeeded: {}", succeeded);
    println!("Rejected (capacity): {}", rejected);
    println!("Other failures: {}", other_failures);
    println!("Booked count: {} (expected {})", booked, expected);
    println!("Time: {:.2}s", elapsed.as_secs_f64());

    if booked != expected || succeeded != expected || other_failures > 0 {
        anyhow::bail!("capacity invariant violated");
    }

    println!("OK");
    Ok(())
}
