//! Breed catalog queries
//!
//! Reference data only: rows are seeded at startup and never written by
//! request handlers.

use serde_json::{json, Value};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::{Breed, Species};
use crate::{Error, Result};

struct SeedBreed {
    code: &'static str,
    name: &'static str,
    species: Species,
    region: &'static str,
    indigenous: bool,
    description: &'static str,
}

const SEED_BREEDS: &[SeedBreed] = &[
    SeedBreed { code: "gir", name: "Gir", species: Species::Cattle, region: "Gujarat", indigenous: true, description: "Dairy breed from the Gir forest, known for high butterfat milk." },
    SeedBreed { code: "sahiwal", name: "Sahiwal", species: Species::Cattle, region: "Punjab", indigenous: true, description: "Heat-tolerant dairy breed with good milk quality." },
    SeedBreed { code: "red_sindhi", name: "Red Sindhi", species: Species::Cattle, region: "Sindh", indigenous: true, description: "Compact red dairy breed adapted to hot climates." },
    SeedBreed { code: "tharparkar", name: "Tharparkar", species: Species::Cattle, region: "Rajasthan", indigenous: true, description: "Dual-purpose desert breed." },
    SeedBreed { code: "kankrej", name: "Kankrej", species: Species::Cattle, region: "Gujarat", indigenous: true, description: "Powerful draught breed with lyre-shaped horns." },
    SeedBreed { code: "ongole", name: "Ongole", species: Species::Cattle, region: "Andhra Pradesh", indigenous: true, description: "Large draught breed with high disease resistance." },
    SeedBreed { code: "hariana", name: "Hariana", species: Species::Cattle, region: "Haryana", indigenous: true, description: "Dual-purpose breed of the northern plains." },
    SeedBreed { code: "rathi", name: "Rathi", species: Species::Cattle, region: "Rajasthan", indigenous: true, description: "Dairy breed of the arid north-west." },
    SeedBreed { code: "hallikar", name: "Hallikar", species: Species::Cattle, region: "Karnataka", indigenous: true, description: "Draught breed from southern India." },
    SeedBreed { code: "jersey_cross", name: "Jersey Cross", species: Species::Cattle, region: "Crossbred", indigenous: false, description: "Jersey crossbred dairy cattle." },
    SeedBreed { code: "holstein_friesian_cross", name: "Holstein Friesian Cross", species: Species::Cattle, region: "Crossbred", indigenous: false, description: "Holstein Friesian crossbred dairy cattle." },
    SeedBreed { code: "murrah", name: "Murrah", species: Species::Buffalo, region: "Haryana", indigenous: true, description: "High-yielding dairy buffalo with tightly curled horns." },
    SeedBreed { code: "mehsana", name: "Mehsana", species: Species::Buffalo, region: "Gujarat", indigenous: true, description: "Dairy buffalo with long lactation." },
    SeedBreed { code: "jaffarabadi", name: "Jaffarabadi", species: Species::Buffalo, region: "Gujarat", indigenous: true, description: "Heavy buffalo breed with drooping horns." },
    SeedBreed { code: "surti", name: "Surti", species: Species::Buffalo, region: "Gujarat", indigenous: true, description: "Medium-sized buffalo with sickle-shaped horns." },
    SeedBreed { code: "nili_ravi", name: "Nili Ravi", species: Species::Buffalo, region: "Punjab", indigenous: true, description: "Dairy buffalo with wall eyes and white markings." },
    SeedBreed { code: "bhadawari", name: "Bhadawari", species: Species::Buffalo, region: "Uttar Pradesh", indigenous: true, description: "Buffalo known for very high milk fat." },
    SeedBreed { code: "pandharpuri", name: "Pandharpuri", species: Species::Buffalo, region: "Maharashtra", indigenous: true, description: "Buffalo with exceptionally long horns." },
];

fn seed_characteristics(code: &str) -> Value {
    match code {
        "gir" => json!({
            "primary_use": "dairy",
            "advantages": ["High butterfat", "Hardy and parasite-resistant"],
            "disadvantages": ["Lower total yield than Murrah"],
        }),
        "sahiwal" => json!({
            "primary_use": "dairy",
            "advantages": ["Heat tolerant", "Good milk quality"],
            "disadvantages": ["Moderate yield compared to specialized breeds"],
        }),
        "murrah" => json!({
            "primary_use": "dairy",
            "advantages": ["High milk yield", "Good adaptability to hot climates"],
            "disadvantages": ["High feed requirements", "Not ideal for cold climates"],
        }),
        "kankrej" | "ongole" | "hallikar" => json!({ "primary_use": "draught" }),
        "tharparkar" | "hariana" => json!({ "primary_use": "dual" }),
        _ => json!({ "primary_use": "dairy" }),
    }
}

/// Insert catalog rows that are not present yet; returns rows inserted
pub async fn seed_breeds(pool: &SqlitePool) -> Result<u64> {
    let created_at = crate::time::to_db_string(crate::time::now());
    let mut inserted = 0;

    for breed in SEED_BREEDS {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO breeds
                (id, name, breed_code, species, description, characteristics, native_region, is_indigenous, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(breed.name)
        .bind(breed.code)
        .bind(breed.species.as_str())
        .bind(breed.description)
        .bind(seed_characteristics(breed.code).to_string())
        .bind(breed.region)
        .bind(breed.indigenous)
        .bind(&created_at)
        .execute(pool)
        .await?;
        inserted += result.rows_affected();
    }

    Ok(inserted)
}

/// List catalog rows, optionally restricted to one species, ordered by name
pub async fn list_breeds(pool: &SqlitePool, species: Option<Species>) -> Result<Vec<Breed>> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, breed_code, species, description, characteristics, native_region, is_indigenous
        FROM breeds
        WHERE (? IS NULL OR species = ?)
        ORDER BY name ASC
        "#,
    )
    .bind(species.map(|s| s.as_str()))
    .bind(species.map(|s| s.as_str()))
    .fetch_all(pool)
    .await?;

    rows.iter().map(breed_from_row).collect()
}

/// Look up one breed by code
pub async fn find_by_code(pool: &SqlitePool, breed_code: &str) -> Result<Option<Breed>> {
    let row = sqlx::query(
        r#"
        SELECT id, name, breed_code, species, description, characteristics, native_region, is_indigenous
        FROM breeds
        WHERE breed_code = ?
        "#,
    )
    .bind(breed_code)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(breed_from_row).transpose()
}

fn breed_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Breed> {
    let species: String = row.get("species");
    let characteristics: String = row.get("characteristics");
    Ok(Breed {
        id: row.get("id"),
        name: row.get("name"),
        breed_code: row.get("breed_code"),
        species: species.parse()?,
        description: row.get("description"),
        characteristics: serde_json::from_str(&characteristics)
            .map_err(|e| Error::Internal(format!("Corrupt breed characteristics: {}", e)))?,
        native_region: row.get("native_region"),
        is_indigenous: row.get("is_indigenous"),
    })
}
