//! Feature Service - paid feature catalogue, purchases and the featured spotlight

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::*;
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, ListingKind, PurchaseStatus};
use crate::models::paid_feature::{self, Entity as PaidFeature};
use crate::models::purchased_feature::{self, Entity as PurchasedFeature};
use crate::models::{artist, event, rating, user, venue};
use crate::utils::{text, time};

pub const MAX_FEATURE_NAME_CHARS: usize = 120;
pub const DEFAULT_FEATURED_LIMIT: u64 = 10;
pub const MAX_FEATURED_LIMIT: u64 = 50;
pub const MAX_DURATION_DAYS: i32 = 3650;

#[derive(Debug, Default, Deserialize)]
pub struct FeatureRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub duration_days: Option<i32>,
    pub target_type: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct GrantRequest {
    pub paid_feature_id: i32,
    pub user_id: i32,
    pub target_id: i32,
    /// Defaults to the feature's own duration
    pub duration_days: Option<i32>,
}

/// A purchase with the names an operator or buyer needs to read it
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseView {
    #[serde(flatten)]
    pub purchase: purchased_feature::Model,
    pub feature_name: String,
    pub username: Option<String>,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeaturedListing {
    pub target_type: ListingKind,
    pub target_id: i32,
    pub name: String,
    pub profile_picture: Option<String>,
    pub feature_name: String,
    pub expires_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub users: u64,
    pub artists: u64,
    pub venues: u64,
    pub events: u64,
    pub ratings: u64,
    pub active_placements: u64,
    pub revenue: f64,
}

#[derive(Debug, FromQueryResult)]
struct RevenueRow {
    revenue: Option<f64>,
}

/// Listing row reduced to what purchases and the spotlight need
struct ListingRef {
    owner_id: i32,
    name: String,
    profile_picture: Option<String>,
}

fn label(kind: ListingKind) -> &'static str {
    match kind {
        ListingKind::Artist => "Artist",
        ListingKind::Venue => "Venue",
        ListingKind::Event => "Event",
    }
}

async fn find_listing(
    db: &DatabaseConnection,
    kind: ListingKind,
    id: i32,
) -> Result<Option<ListingRef>, DomainError> {
    let found = match kind {
        ListingKind::Artist => artist::Entity::find_by_id(id)
            .one(db)
            .await?
            .map(|a| ListingRef {
                owner_id: a.user_id,
                name: a.name,
                profile_picture: a.profile_picture,
            }),
        ListingKind::Venue => venue::Entity::find_by_id(id)
            .one(db)
            .await?
            .map(|v| ListingRef {
                owner_id: v.user_id,
                name: v.name,
                profile_picture: v.profile_picture,
            }),
        ListingKind::Event => event::Entity::find_by_id(id)
            .one(db)
            .await?
            .map(|e| ListingRef {
                owner_id: e.organiser_id,
                name: e.name,
                profile_picture: e.profile_picture,
            }),
    };
    Ok(found)
}

/// New expiry: placements stack on top of a still-running one for the same target
pub fn next_expiry(
    now: DateTime<Utc>,
    current: Option<DateTime<Utc>>,
    duration_days: i32,
) -> Result<DateTime<Utc>, DomainError> {
    let base = current.filter(|c| *c > now).unwrap_or(now);
    time::add_days(base, duration_days)
}

fn check_price(price: f64) -> Result<f64, DomainError> {
    if !price.is_finite() || price < 0.0 {
        return Err(DomainError::validation("price must be 0 or more"));
    }
    Ok(price)
}

fn check_duration(days: i32) -> Result<i32, DomainError> {
    if !(1..=MAX_DURATION_DAYS).contains(&days) {
        return Err(DomainError::Validation(format!(
            "duration_days must be between 1 and {}",
            MAX_DURATION_DAYS
        )));
    }
    Ok(days)
}

async fn ensure_name_free(
    db: &DatabaseConnection,
    name: &str,
    except: Option<i32>,
) -> Result<(), DomainError> {
    let mut query = PaidFeature::find().filter(paid_feature::Column::Name.eq(name));
    if let Some(id) = except {
        query = query.filter(paid_feature::Column::Id.ne(id));
    }
    if query.one(db).await?.is_some() {
        return Err(DomainError::Conflict(format!(
            "A feature named '{}' already exists",
            name
        )));
    }
    Ok(())
}

pub async fn find_feature(
    db: &DatabaseConnection,
    id: i32,
) -> Result<paid_feature::Model, DomainError> {
    PaidFeature::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found("Feature"))
}

// ---------------------------------------------------------------------------
// Catalogue
// ---------------------------------------------------------------------------

pub async fn list_features(
    db: &DatabaseConnection,
    only_active: bool,
    target_type: Option<ListingKind>,
) -> Result<Vec<paid_feature::Model>, DomainError> {
    let mut query = PaidFeature::find();
    if only_active {
        query = query.filter(paid_feature::Column::IsActive.eq(true));
    }
    if let Some(kind) = target_type {
        query = query.filter(paid_feature::Column::TargetType.eq(kind.as_str()));
    }

    Ok(query
        .order_by_asc(paid_feature::Column::TargetType)
        .order_by_asc(paid_feature::Column::Price)
        .order_by_asc(paid_feature::Column::Id)
        .all(db)
        .await?)
}

pub async fn create_feature(
    db: &DatabaseConnection,
    request: FeatureRequest,
) -> Result<paid_feature::Model, DomainError> {
    let name = text::required("name", request.name, MAX_FEATURE_NAME_CHARS)?;
    let price = check_price(request.price.unwrap_or(0.0))?;
    let duration_days = check_duration(
        request
            .duration_days
            .ok_or_else(|| DomainError::validation("duration_days is required"))?,
    )?;
    let target_type: ListingKind = request
        .target_type
        .ok_or_else(|| DomainError::validation("target_type is required"))?
        .parse()?;

    ensure_name_free(db, &name, None).await?;

    let now = time::now();
    let feature = paid_feature::ActiveModel {
        name: Set(name),
        description: Set(text::clean(request.description)),
        price: Set(price),
        duration_days: Set(duration_days),
        target_type: Set(target_type.as_str().to_string()),
        is_active: Set(request.is_active.unwrap_or(true)),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!("Created paid feature '{}' ({})", feature.name, feature.id);
    Ok(feature)
}

pub async fn update_feature(
    db: &DatabaseConnection,
    id: i32,
    request: FeatureRequest,
) -> Result<paid_feature::Model, DomainError> {
    let existing = find_feature(db, id).await?;
    let mut active: paid_feature::ActiveModel = existing.into();

    if request.name.is_some() {
        let name = text::required("name", request.name, MAX_FEATURE_NAME_CHARS)?;
        ensure_name_free(db, &name, Some(id)).await?;
        active.name = Set(name);
    }
    if request.description.is_some() {
        active.description = Set(text::clean(request.description));
    }
    if let Some(price) = request.price {
        active.price = Set(check_price(price)?);
    }
    if let Some(days) = request.duration_days {
        active.duration_days = Set(check_duration(days)?);
    }
    if let Some(raw) = request.target_type {
        let kind: ListingKind = raw.parse()?;
        active.target_type = Set(kind.as_str().to_string());
    }
    if let Some(is_active) = request.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(time::now());

    Ok(active.update(db).await?)
}

/// Delete a catalogue entry; its purchases go with it
pub async fn delete_feature(db: &DatabaseConnection, id: i32) -> Result<(), DomainError> {
    let result = PaidFeature::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(DomainError::not_found("Feature"));
    }
    tracing::info!("Deleted paid feature {}", id);
    Ok(())
}

// ---------------------------------------------------------------------------
// Purchases
// ---------------------------------------------------------------------------

async fn record_placement(
    db: &DatabaseConnection,
    feature: &paid_feature::Model,
    user_id: i32,
    target_id: i32,
    duration_days: i32,
    amount: f64,
) -> Result<purchased_feature::Model, DomainError> {
    let now_ts = Utc::now();
    let now = time::format(now_ts);

    let running = PurchasedFeature::find()
        .filter(purchased_feature::Column::PaidFeatureId.eq(feature.id))
        .filter(purchased_feature::Column::TargetType.eq(feature.target_type.as_str()))
        .filter(purchased_feature::Column::TargetId.eq(target_id))
        .filter(purchased_feature::Column::ExpiresAt.gt(now.as_str()))
        .order_by_desc(purchased_feature::Column::ExpiresAt)
        .one(db)
        .await?;

    let expires = next_expiry(
        now_ts,
        running.map(|p| time::parse(&p.expires_at)),
        duration_days,
    )?;

    let purchase = purchased_feature::ActiveModel {
        paid_feature_id: Set(feature.id),
        user_id: Set(user_id),
        target_type: Set(feature.target_type.clone()),
        target_id: Set(target_id),
        amount: Set(amount),
        purchased_at: Set(now),
        expires_at: Set(time::format(expires)),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(purchase)
}

/// A user buys a placement for one of their own listings
pub async fn purchase(
    db: &DatabaseConnection,
    user_id: i32,
    feature_id: i32,
    target_id: i32,
) -> Result<purchased_feature::Model, DomainError> {
    let feature = find_feature(db, feature_id).await?;
    if !feature.is_active {
        return Err(DomainError::validation(
            "This feature is not currently available",
        ));
    }

    let kind: ListingKind = feature.target_type.parse()?;
    let listing = find_listing(db, kind, target_id)
        .await?
        .ok_or_else(|| DomainError::not_found(label(kind)))?;
    if listing.owner_id != user_id {
        return Err(DomainError::forbidden(format!(
            "You can only promote your own {}",
            kind
        )));
    }

    let purchase = record_placement(
        db,
        &feature,
        user_id,
        target_id,
        feature.duration_days,
        feature.price,
    )
    .await?;

    tracing::info!(
        "User {} bought '{}' for {} {} until {}",
        user_id,
        feature.name,
        kind,
        target_id,
        purchase.expires_at
    );
    Ok(purchase)
}

/// An administrator grants a complimentary placement
pub async fn grant(
    db: &DatabaseConnection,
    request: GrantRequest,
) -> Result<purchased_feature::Model, DomainError> {
    let feature = find_feature(db, request.paid_feature_id).await?;
    let duration = check_duration(request.duration_days.unwrap_or(feature.duration_days))?;

    if user::Entity::find_by_id(request.user_id)
        .one(db)
        .await?
        .is_none()
    {
        return Err(DomainError::not_found("User"));
    }

    let kind: ListingKind = feature.target_type.parse()?;
    if find_listing(db, kind, request.target_id).await?.is_none() {
        return Err(DomainError::not_found(label(kind)));
    }

    let purchase =
        record_placement(db, &feature, request.user_id, request.target_id, duration, 0.0).await?;

    tracing::info!(
        "Granted '{}' to {} {} until {}",
        feature.name,
        kind,
        request.target_id,
        purchase.expires_at
    );
    Ok(purchase)
}

pub async fn revoke(db: &DatabaseConnection, id: i32) -> Result<(), DomainError> {
    let result = PurchasedFeature::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(DomainError::not_found("Purchase"));
    }
    tracing::info!("Revoked purchase {}", id);
    Ok(())
}

async fn with_names(
    db: &DatabaseConnection,
    rows: Vec<(purchased_feature::Model, Option<paid_feature::Model>)>,
) -> Result<Vec<PurchaseView>, DomainError> {
    let user_ids: Vec<i32> = rows.iter().map(|(p, _)| p.user_id).collect();
    let usernames: HashMap<i32, String> = if user_ids.is_empty() {
        HashMap::new()
    } else {
        user::Entity::find()
            .filter(user::Column::Id.is_in(user_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect()
    };

    let now = time::now();
    Ok(rows
        .into_iter()
        .map(|(purchase, feature)| PurchaseView {
            feature_name: feature.map(|f| f.name).unwrap_or_default(),
            username: usernames.get(&purchase.user_id).cloned(),
            active: purchase.expires_at > now,
            purchase,
        })
        .collect())
}

pub async fn purchases_for_user(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<PurchaseView>, DomainError> {
    let rows = PurchasedFeature::find()
        .filter(purchased_feature::Column::UserId.eq(user_id))
        .order_by_desc(purchased_feature::Column::PurchasedAt)
        .order_by_desc(purchased_feature::Column::Id)
        .find_also_related(PaidFeature)
        .all(db)
        .await?;
    with_names(db, rows).await
}

pub async fn list_purchases(
    db: &DatabaseConnection,
    status: PurchaseStatus,
    target_type: Option<ListingKind>,
) -> Result<Vec<PurchaseView>, DomainError> {
    let now = time::now();
    let mut query = PurchasedFeature::find();

    match status {
        PurchaseStatus::Active => {
            query = query.filter(purchased_feature::Column::ExpiresAt.gt(now.as_str()));
        }
        PurchaseStatus::Expired => {
            query = query.filter(purchased_feature::Column::ExpiresAt.lte(now.as_str()));
        }
        PurchaseStatus::All => {}
    }
    if let Some(kind) = target_type {
        query = query.filter(purchased_feature::Column::TargetType.eq(kind.as_str()));
    }

    let rows = query
        .order_by_desc(purchased_feature::Column::PurchasedAt)
        .order_by_desc(purchased_feature::Column::Id)
        .find_also_related(PaidFeature)
        .all(db)
        .await?;
    with_names(db, rows).await
}

/// Currently promoted listings, one entry per listing, latest expiry first
pub async fn featured(
    db: &DatabaseConnection,
    target_type: Option<ListingKind>,
    limit: Option<u64>,
) -> Result<Vec<FeaturedListing>, DomainError> {
    let limit = limit
        .unwrap_or(DEFAULT_FEATURED_LIMIT)
        .clamp(1, MAX_FEATURED_LIMIT) as usize;

    let mut query = PurchasedFeature::find()
        .filter(purchased_feature::Column::ExpiresAt.gt(time::now()));
    if let Some(kind) = target_type {
        query = query.filter(purchased_feature::Column::TargetType.eq(kind.as_str()));
    }

    let rows = query
        .order_by_desc(purchased_feature::Column::ExpiresAt)
        .order_by_desc(purchased_feature::Column::Id)
        .find_also_related(PaidFeature)
        .all(db)
        .await?;

    let mut seen = HashSet::new();
    let mut listings = Vec::new();

    for (purchase, feature) in rows {
        if listings.len() == limit {
            break;
        }
        let Ok(kind) = purchase.target_type.parse::<ListingKind>() else {
            continue;
        };
        if !seen.insert((kind, purchase.target_id)) {
            continue;
        }
        // Listings deleted after the purchase simply drop out
        let Some(listing) = find_listing(db, kind, purchase.target_id).await? else {
            continue;
        };

        listings.push(FeaturedListing {
            target_type: kind,
            target_id: purchase.target_id,
            name: listing.name,
            profile_picture: listing.profile_picture,
            feature_name: feature.map(|f| f.name).unwrap_or_default(),
            expires_at: purchase.expires_at,
        });
    }

    Ok(listings)
}

pub async fn stats(db: &DatabaseConnection) -> Result<DashboardStats, DomainError> {
    let revenue = PurchasedFeature::find()
        .select_only()
        .column_as(
            SimpleExpr::from(Func::sum(Expr::col(purchased_feature::Column::Amount))),
            "revenue",
        )
        .into_model::<RevenueRow>()
        .one(db)
        .await?
        .and_then(|row| row.revenue)
        .unwrap_or(0.0);

    Ok(DashboardStats {
        users: user::Entity::find().count(db).await?,
        artists: artist::Entity::find().count(db).await?,
        venues: venue::Entity::find().count(db).await?,
        events: event::Entity::find().count(db).await?,
        ratings: rating::Entity::find().count(db).await?,
        active_placements: PurchasedFeature::find()
            .filter(purchased_feature::Column::ExpiresAt.gt(time::now()))
            .count(db)
            .await?,
        revenue: (revenue * 100.0).round() / 100.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn expiry_starts_now_without_a_running_placement() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        assert_eq!(
            time::format(next_expiry(now, None, 7).unwrap()),
            "2026-10-25T12:00:00Z"
        );
    }

    #[test]
    fn expiry_extends_a_running_placement() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let running = Utc.with_ymd_and_hms(2026, 10, 20, 12, 0, 0).unwrap();
        assert_eq!(
            time::format(next_expiry(now, Some(running), 7).unwrap()),
            "2026-10-27T12:00:00Z"
        );
    }

    #[test]
    fn lapsed_placements_do_not_count() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let lapsed = Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap();
        assert_eq!(
            next_expiry(now, Some(lapsed), 1).unwrap(),
            time::add_days(now, 1).unwrap()
        );
    }

    #[test]
    fn price_and_duration_bounds() {
        assert!(check_price(-0.01).is_err());
        assert!(check_price(f64::NAN).is_err());
        assert_eq!(check_price(0.0).unwrap(), 0.0);
        assert!(check_duration(0).is_err());
        assert_eq!(check_duration(30).unwrap(), 30);
        assert_eq!(check_duration(MAX_DURATION_DAYS).unwrap(), MAX_DURATION_DAYS);
        assert!(check_duration(MAX_DURATION_DAYS + 1).is_err());
        assert!(check_duration(i32::MAX).is_err());
    }
}
