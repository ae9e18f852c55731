//! Database seeder for Paylane development and testing.
//!
//! Seeds a funded customer wallet and an empty merchant vault in each
//! currency, with fixed IDs so local requests can be replayed by hand.
//!
//! Usage: cargo run --bin seeder

use chrono::Utc;
use paylane_db::LedgerRepository;
use paylane_db::entities::{accounts, sea_orm_active_enums::CurrencyCode};
use paylane_shared::DatabaseConfig;
use paylane_shared::types::{AccountId, Money};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

/// Opening balance of each seeded wallet, in minor units.
const WALLET_FUNDING: i64 = 10_000_000;

/// A seeded account.
struct SeedAccount {
    id: &'static str,
    owner_name: &'static str,
    currency: CurrencyCode,
    funding: i64,
}

const ACCOUNTS: [SeedAccount; 4] = [
    SeedAccount {
        id: "00000000-0000-0000-0000-000000000001",
        owner_name: "Demo Wallet (TZS)",
        currency: CurrencyCode::Tzs,
        funding: WALLET_FUNDING,
    },
    SeedAccount {
        id: "00000000-0000-0000-0000-000000000002",
        owner_name: "Demo Merchant (TZS)",
        currency: CurrencyCode::Tzs,
        funding: 0,
    },
    SeedAccount {
        id: "00000000-0000-0000-0000-000000000003",
        owner_name: "Demo Wallet (USD)",
        currency: CurrencyCode::Usd,
        funding: WALLET_FUNDING,
    },
    SeedAccount {
        id: "00000000-0000-0000-0000-000000000004",
        owner_name: "Demo Merchant (USD)",
        currency: CurrencyCode::Usd,
        funding: 0,
    },
];

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = paylane_db::connect(&DatabaseConfig {
        url: database_url,
        max_connections: 2,
        min_connections: 0,
    })
    .await
    .expect("Failed to connect to database");

    println!("Seeding demo accounts...");
    for account in &ACCOUNTS {
        seed_account(&db, account).await;
    }

    println!("Seeding complete!");
}

/// Creates one account and funds it through a deposit, unless it already exists.
async fn seed_account(db: &DatabaseConnection, seed: &SeedAccount) {
    let id = Uuid::parse_str(seed.id).expect("seed account ids are valid UUIDs");

    if accounts::Entity::find_by_id(id)
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  {} already exists, skipping...", seed.owner_name);
        return;
    }

    let account = accounts::ActiveModel {
        id: Set(id),
        owner_name: Set(seed.owner_name.to_string()),
        balance: Set(0),
        currency: Set(seed.currency),
        created_at: Set(Utc::now().into()),
    };

    if let Err(e) = account.insert(db).await {
        eprintln!("Failed to insert {}: {e}", seed.owner_name);
        return;
    }
    println!("  Created {}: {id}", seed.owner_name);

    if seed.funding > 0 {
        match LedgerRepository::new(db.clone())
            .deposit(AccountId::from_uuid(id), seed.funding, "Seed Funding")
            .await
        {
            Ok(transaction) => println!(
                "    Funded with {} ({})",
                Money::new(seed.funding, seed.currency.into()),
                transaction.id
            ),
            Err(e) => eprintln!("Failed to fund {}: {e}", seed.owner_name),
        }
    }
}
