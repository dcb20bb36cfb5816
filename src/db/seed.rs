use crate::db::{AssetInsert, PortalStore};
use crate::domain::models::{AssetStatus, PmSummary, ServiceFrequency, UserProfile, UserRole};
use anyhow::Result;
use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use rand_core::OsRng;
use uuid::Uuid;

struct SeedUser<'a> {
    name: &'a str,
    email: &'a str,
    organization: &'a str,
    role: UserRole,
}

struct SeedType<'a> {
    name: &'a str,
    frequency: ServiceFrequency,
    compliance: f64,
    due_in_days: i64,
}

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("failed to hash password: {}", e))?
        .to_string();
    Ok(hash)
}

pub async fn seed_demo(store: &dyn PortalStore, password: &str) -> Result<()> {
    seed_users(store, password).await?;
    seed_fleet(store).await?;
    Ok(())
}

async fn seed_users(store: &dyn PortalStore, password: &str) -> Result<()> {
    let users = [
        SeedUser {
            name: "PRS Service Desk",
            email: "admin@prs-industrial.example",
            organization: "PRS Industrial",
            role: UserRole::Admin,
        },
        SeedUser {
            name: "Facility Manager",
            email: "facilities@customer.example",
            organization: "Northside Distribution",
            role: UserRole::Customer,
        },
    ];

    let hash = hash_password(password)?;
    for user in &users {
        store
            .insert_profile(&UserProfile {
                id: Uuid::new_v4(),
                full_name: user.name.to_string(),
                email: user.email.to_string(),
                organization: Some(user.organization.to_string()),
                role: user.role,
                password_hash: hash.clone(),
                created_at: Utc::now(),
            })
            .await?;
    }
    tracing::info!("Seeded {} demo users", users.len());
    Ok(())
}

async fn seed_fleet(store: &dyn PortalStore) -> Result<()> {
    let types = [
        SeedType {
            name: "Forklift",
            frequency: ServiceFrequency::Monthly,
            compliance: 92.5,
            due_in_days: 12,
        },
        SeedType {
            name: "Dock Door",
            frequency: ServiceFrequency::Quarterly,
            compliance: 78.0,
            due_in_days: 45,
        },
        SeedType {
            name: "Dock Leveler",
            frequency: ServiceFrequency::Quarterly,
            compliance: 64.0,
            due_in_days: 3,
        },
        SeedType {
            name: "Vehicle Restraint",
            frequency: ServiceFrequency::Annually,
            compliance: 100.0,
            due_in_days: 200,
        },
    ];

    let today = Utc::now().date_naive();
    for seed in &types {
        let asset_type = store.insert_asset_type(seed.name).await?;
        store
            .insert_pm_summary(&PmSummary {
                id: Uuid::new_v4(),
                asset_type_id: asset_type.id,
                asset_type_name: asset_type.name.clone(),
                service_frequency: seed.frequency,
                total_units_serviced: 0,
                compliance_percentage: seed.compliance,
                next_service_due: Some(today + Duration::days(seed.due_in_days)),
                updated_at: Utc::now(),
            })
            .await?;
    }

    if !store.list_assets().await?.is_empty() {
        return Ok(());
    }

    let asset_types = store.list_asset_types().await?;
    for asset_type in &asset_types {
        let prefix: String = asset_type
            .name
            .split_whitespace()
            .filter_map(|w| w.chars().next())
            .collect::<String>()
            .to_uppercase();
        for n in 1..=2 {
            store
                .insert_asset(&AssetInsert {
                    asset_number: format!("{}-{:03}", prefix, n),
                    asset_type_id: asset_type.id,
                    location: format!("Warehouse {}, Bay {}", if n == 1 { "A" } else { "B" }, n),
                    status: AssetStatus::Active,
                })
                .await?;
        }
    }
    tracing::info!("Seeded {} asset types with demo assets", asset_types.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use argon2::{password_hash::PasswordHash, PasswordVerifier};

    #[tokio::test]
    async fn seeding_twice_is_idempotent() {
        let store = MemoryStore::new();
        seed_demo(&store, "letmein").await.unwrap();
        seed_demo(&store, "letmein").await.unwrap();

        assert_eq!(store.list_asset_types().await.unwrap().len(), 4);
        assert_eq!(store.list_assets().await.unwrap().len(), 8);
        let summaries = store.list_pm_summaries().await.unwrap();
        assert!(summaries.iter().all(|s| s.total_units_serviced == 2));
    }

    #[test]
    fn hashed_password_verifies() {
        let hash = hash_password("letmein").unwrap();
        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(Argon2::default().verify_password(b"letmein", &parsed).is_ok());
        assert!(Argon2::default().verify_password(b"nope", &parsed).is_err());
    }
}
