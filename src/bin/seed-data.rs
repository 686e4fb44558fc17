//! Sample data seed script
//!
//! Seeds the configured store (remote if reachable, local snapshot
//! otherwise) with:
//! - 2 users: 1 admin, 1 student (bcrypt-hashed passwords)
//! - a small meal catalogue covering every category
//!
//! Usage:
//!   SNAPSHOT_PATH=data/mock_db.json SEED_PASSWORD=123456 ./seed-data [--keep-existing]
//!
//! Environment variables:
//!   SNAPSHOT_PATH   — local snapshot file (default: data/mock_db.json)
//!   REMOTE_DB_URL   — remote document store base URL (optional)
//!   SEED_PASSWORD   — password for both accounts (default: 123456)

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use uuid::Uuid;

use mess_api::{
    config::StorageConfig,
    db::{record_id, to_record, Bridge, Record},
    models::user::{User, UserRole},
};

#[derive(Parser)]
#[command(name = "seed-data", about = "Seed users and meals into the mess store")]
struct Args {
    /// Append to existing users/meals instead of replacing them
    #[arg(long)]
    keep_existing: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();
    let password = std::env::var("SEED_PASSWORD").unwrap_or_else(|_| "123456".to_string());

    let storage = StorageConfig::from_env()?;
    let bridge = Bridge::from_config(&storage)?;
    bridge.init().await;

    println!("=== Seed mess data ===");

    // 1. Users
    let hash = bcrypt::hash(&password, bcrypt::DEFAULT_COST).context("Failed to hash password")?;
    let seeded_users = [
        User {
            id: Uuid::new_v4().to_string(),
            name: "Admin User".into(),
            email: "admin@hms.com".into(),
            password: hash.clone(),
            role: UserRole::Admin,
            roll_number: None,
        },
        User {
            id: Uuid::new_v4().to_string(),
            name: "Student User".into(),
            email: "student@hms.com".into(),
            password: hash,
            role: UserRole::Student,
            roll_number: Some("CS101".into()),
        },
    ];

    let mut users = if args.keep_existing { bridge.get_users().await } else { Vec::new() };
    users.retain(|u| {
        let email = u.get("email").and_then(|e| e.as_str());
        !seeded_users.iter().any(|s| Some(s.email.as_str()) == email)
    });
    for user in &seeded_users {
        users.push(to_record(user)?);
    }
    let outcome = bridge.save_users(&users).await;
    anyhow::ensure!(outcome.is_committed(), "Failed to write users");
    println!("  Users written to {} store", outcome.as_str());

    // 2. Meals
    let mut meals = if args.keep_existing { bridge.get_meals().await } else { Vec::new() };
    let existing: Vec<String> = meals.iter().filter_map(record_id).collect();
    for meal in sample_meals() {
        if !existing.iter().any(|id| Some(id) == record_id(&meal).as_ref()) {
            meals.push(meal);
        }
    }
    let outcome = bridge.save_meals(&meals).await;
    anyhow::ensure!(outcome.is_committed(), "Failed to write meals");
    println!("  {} meals written to {} store", meals.len(), outcome.as_str());

    println!("Admin: admin@hms.com / {password}");
    println!("Student: student@hms.com / {password}");
    Ok(())
}

fn sample_meals() -> Vec<Record> {
    let raw = [
        json!({ "_id": "seed-idli", "name": "Idli & Sambar", "category": "Main Course", "type": "Veg",
                "imageUrl": "", "nutritionalInfo": { "calories": 150, "protein": 4 },
                "ratingWindow": { "startTime": "07:00", "endTime": "10:00" } }),
        json!({ "_id": "seed-biryani", "name": "Chicken Biryani", "category": "Main Course", "type": "Non-Veg",
                "imageUrl": "", "nutritionalInfo": { "calories": 450, "protein": 25 },
                "ratingWindow": { "startTime": "12:00", "endTime": "14:00" } }),
        json!({ "_id": "seed-omelette", "name": "Masala Omelette", "category": "Side Dish", "type": "Egg",
                "imageUrl": "", "nutritionalInfo": { "calories": 180, "protein": 12 },
                "ratingWindow": { "startTime": "07:00", "endTime": "10:00" } }),
        json!({ "_id": "seed-samosa", "name": "Samosa", "category": "Starter", "type": "Veg",
                "imageUrl": "", "nutritionalInfo": { "calories": 260, "protein": 5 },
                "ratingWindow": { "startTime": "16:30", "endTime": "18:00" } }),
        json!({ "_id": "seed-chai", "name": "Masala Chai", "category": "Beverage", "type": "Veg",
                "imageUrl": "", "nutritionalInfo": { "calories": 90, "protein": 3 },
                "ratingWindow": { "startTime": "16:30", "endTime": "18:00" } }),
    ];
    raw.into_iter()
        .filter_map(|v| v.as_object().cloned())
        .collect()
}
