//! Sample data for local development.
//!
//! Loads a demo user plus a handful of stores and reviews through the same
//! repositories the web server uses, so seeded rows get real slugs and
//! validated fields.

use localspot_web::db::reviews::ReviewRepository;
use localspot_web::db::stores::StoreRepository;
use localspot_web::db::users::UserRepository;
use localspot_web::models::{ReviewInput, StoreInput};
use localspot_web::services::auth::AuthService;

use localspot_core::Email;

use super::CommandError;

const DEMO_EMAIL: &str = "demo@localspot.test";
const DEMO_PASSWORD: &str = "demo-password";

struct SeedStore {
    name: &'static str,
    description: &'static str,
    address: &'static str,
    lng: f64,
    lat: f64,
    tags: &'static [&'static str],
    rating: i16,
    review: &'static str,
}

const STORES: &[SeedStore] = &[
    SeedStore {
        name: "Grandview Diner",
        description: "All-day breakfast and bottomless coffee a block from the park.",
        address: "202 Grandview Ave, Seattle, WA",
        lng: -122.336,
        lat: 47.606,
        tags: &["Family Friendly", "Wifi"],
        rating: 4,
        review: "The hash browns alone are worth the trip.",
    },
    SeedStore {
        name: "Night Owl Records",
        description: "Used vinyl, listening stations, and a shop cat named Mingus.",
        address: "77 Pine St, Seattle, WA",
        lng: -122.340,
        lat: 47.610,
        tags: &["Open Late"],
        rating: 5,
        review: "Found a first pressing I'd been hunting for years.",
    },
    SeedStore {
        name: "Harbor Greens",
        description: "Vegetarian bowls and juices, heavy on the local produce.",
        address: "15 Alaskan Way, Seattle, WA",
        lng: -122.342,
        lat: 47.603,
        tags: &["Vegetarian", "Family Friendly"],
        rating: 4,
        review: "Fast, fresh, and the patio view is unbeatable.",
    },
    SeedStore {
        name: "The Brass Tap",
        description: "Two dozen rotating taps and trivia on Thursdays.",
        address: "901 Union St, Seattle, WA",
        lng: -122.332,
        lat: 47.612,
        tags: &["Licensed", "Open Late", "Wifi"],
        rating: 3,
        review: "Great pours, but get there early on trivia night.",
    },
    SeedStore {
        name: "Paper Crane Books",
        description: "Small-press fiction, poetry readings, and very strong espresso.",
        address: "410 Boren Ave, Seattle, WA",
        lng: -122.328,
        lat: 47.615,
        tags: &["Wifi"],
        rating: 5,
        review: "The staff picks shelf has never steered me wrong.",
    },
];

/// Load the sample data.
///
/// Safe to run once against an empty database; rerunning fails on the
/// demo user's unique email rather than duplicating stores.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn load() -> Result<(), CommandError> {
    let pool = super::connect().await?;

    tracing::info!("Creating demo user {DEMO_EMAIL}...");
    let auth = AuthService::new(&pool);
    let user = auth.register(DEMO_EMAIL, "Demo User", DEMO_PASSWORD).await?;

    let stores = StoreRepository::new(&pool);
    let reviews = ReviewRepository::new(&pool);

    for seed in STORES {
        let input = StoreInput {
            name: seed.name.to_owned(),
            description: seed.description.to_owned(),
            tags: seed.tags.iter().map(ToString::to_string).collect(),
            address: seed.address.to_owned(),
            lng: Some(seed.lng),
            lat: Some(seed.lat),
            photo: None,
        };
        let store = stores.create(&input, user.id).await?;
        tracing::info!("Created store '{}' ({})", store.name, store.slug);

        reviews
            .add(
                user.id,
                store.id,
                &ReviewInput {
                    rating: seed.rating,
                    body: seed.review.to_owned(),
                },
            )
            .await?;
    }

    tracing::info!(
        "Seeded {} stores. Log in as {DEMO_EMAIL} / {DEMO_PASSWORD}",
        STORES.len()
    );
    Ok(())
}

/// Remove everything `load` created. Cascades take the stores, reviews,
/// and hearts with the demo user.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the delete fails.
pub async fn wipe() -> Result<(), CommandError> {
    let pool = super::connect().await?;

    let email = Email::parse(DEMO_EMAIL)?;
    let users = UserRepository::new(&pool);

    match users.get_by_email(&email).await? {
        Some(user) => {
            sqlx::query("DELETE FROM site_user WHERE id = $1")
                .bind(user.id.as_i32())
                .execute(&pool)
                .await?;
            tracing::info!("Removed demo user and their stores");
        }
        None => tracing::info!("Nothing to wipe"),
    }

    Ok(())
}
