use chrono::{Duration, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::*;

use crate::domain::{DomainError, UserRole};
use crate::infrastructure::auth::hash_password;
use crate::models::{
    artist, encode_gallery, event, event_artist, paid_feature, rating, user, venue,
};
use crate::utils::time;

pub const DEMO_PASSWORD: &str = "password123";

const DEMO_USERS: &[(&str, UserRole)] = &[
    ("demo_fan", UserRole::Fan),
    ("demo_artist", UserRole::Artist),
    ("demo_organiser", UserRole::Organiser),
    ("demo_venue", UserRole::Venue),
];

async fn demo_user(db: &DatabaseConnection, username: &str) -> Result<user::Model, DomainError> {
    user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?
        .ok_or_else(|| DomainError::Internal(format!("demo user {} missing", username)))
}

async fn rate(
    db: &DatabaseConnection,
    user_id: i32,
    rateable_type: &str,
    rateable_id: i32,
    score: i32,
    review: &str,
) -> Result<(), DomainError> {
    let now = time::now();
    let row = rating::ActiveModel {
        user_id: Set(user_id),
        rateable_id: Set(rateable_id),
        rateable_type: Set(rateable_type.to_owned()),
        score: Set(score),
        review: Set(Some(review.to_owned())),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    let res = rating::Entity::insert(row)
        .on_conflict(
            OnConflict::columns([
                rating::Column::UserId,
                rating::Column::RateableId,
                rating::Column::RateableType,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec(db)
        .await;

    match res {
        Ok(_) | Err(DbErr::RecordNotInserted) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Seed a small, browsable data set. Running it twice changes nothing.
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DomainError> {
    let now = time::now();
    let password_hash = hash_password(DEMO_PASSWORD).map_err(DomainError::Internal)?;

    // 1. Users
    for (username, role) in DEMO_USERS {
        let row = user::ActiveModel {
            username: Set((*username).to_owned()),
            email: Set(format!("{}@mygigguide.local", username)),
            password_hash: Set(password_hash.clone()),
            role: Set(role.as_str().to_owned()),
            profile_picture: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        };
        let res = user::Entity::insert(row)
            .on_conflict(
                OnConflict::column(user::Column::Username)
                    .do_nothing()
                    .to_owned(),
            )
            .exec(db)
            .await;
        match res {
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e.into()),
        }
    }

    let fan = demo_user(db, "demo_fan").await?;
    let musician = demo_user(db, "demo_artist").await?;
    let organiser = demo_user(db, "demo_organiser").await?;
    let venue_owner = demo_user(db, "demo_venue").await?;

    // 2. Listings, only when the demo accounts have none yet
    let band = match artist::Entity::find()
        .filter(artist::Column::UserId.eq(musician.id))
        .one(db)
        .await?
    {
        Some(existing) => existing,
        None => {
            artist::ActiveModel {
                user_id: Set(musician.id),
                name: Set("The Night Owls".to_owned()),
                genre: Set(Some("Indie Rock".to_owned())),
                bio: Set(Some("Four-piece playing loud songs about quiet towns.".to_owned())),
                location: Set(Some("Manchester".to_owned())),
                website: Set(None),
                profile_picture: Set(None),
                gallery: Set(encode_gallery(&[])),
                created_at: Set(now.clone()),
                updated_at: Set(now.clone()),
                ..Default::default()
            }
            .insert(db)
            .await?
        }
    };

    let room = match venue::Entity::find()
        .filter(venue::Column::UserId.eq(venue_owner.id))
        .one(db)
        .await?
    {
        Some(existing) => existing,
        None => {
            venue::ActiveModel {
                user_id: Set(venue_owner.id),
                name: Set("The Velvet Room".to_owned()),
                address: Set(Some("12 Canal Street".to_owned())),
                city: Set(Some("Manchester".to_owned())),
                capacity: Set(Some(350)),
                description: Set(Some("Basement club with a proper sound system.".to_owned())),
                website: Set(None),
                profile_picture: Set(None),
                gallery: Set(encode_gallery(&[])),
                created_at: Set(now.clone()),
                updated_at: Set(now.clone()),
                ..Default::default()
            }
            .insert(db)
            .await?
        }
    };

    let gig = match event::Entity::find()
        .filter(event::Column::OrganiserId.eq(organiser.id))
        .one(db)
        .await?
    {
        Some(existing) => existing,
        None => {
            let starts = Utc::now() + Duration::days(7);
            event::ActiveModel {
                organiser_id: Set(organiser.id),
                venue_id: Set(Some(room.id)),
                name: Set("Friday Night Live".to_owned()),
                description: Set(Some("Local bands, late bar.".to_owned())),
                starts_at: Set(time::format(starts)),
                ends_at: Set(Some(time::format(starts + Duration::hours(4)))),
                ticket_price: Set(Some(12.5)),
                ticket_url: Set(None),
                profile_picture: Set(None),
                gallery: Set(encode_gallery(&[])),
                created_at: Set(now.clone()),
                updated_at: Set(now.clone()),
                ..Default::default()
            }
            .insert(db)
            .await?
        }
    };

    let lineup = event_artist::Entity::insert(event_artist::ActiveModel {
        event_id: Set(gig.id),
        artist_id: Set(band.id),
    })
    .on_conflict(
        OnConflict::columns([event_artist::Column::EventId, event_artist::Column::ArtistId])
            .do_nothing()
            .to_owned(),
    )
    .exec(db)
    .await;
    match lineup {
        Ok(_) | Err(DbErr::RecordNotInserted) => {}
        Err(e) => return Err(e.into()),
    }

    // 3. Ratings from the fan
    rate(db, fan.id, "artist", band.id, 5, "Best live act in town.").await?;
    rate(db, fan.id, "venue", room.id, 4, "Great sound, small bar.").await?;
    rate(db, fan.id, "event", gig.id, 5, "Worth every penny.").await?;
    rate(db, fan.id, "organiser", organiser.id, 4, "Always on time.").await?;

    // 4. Paid feature catalogue
    let spotlight = paid_feature::ActiveModel {
        name: Set("Homepage Spotlight".to_owned()),
        description: Set(Some("Artist shown on the home page for a week".to_owned())),
        price: Set(9.99),
        duration_days: Set(7),
        target_type: Set("artist".to_owned()),
        is_active: Set(true),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    let res = paid_feature::Entity::insert(spotlight)
        .on_conflict(
            OnConflict::column(paid_feature::Column::Name)
                .do_nothing()
                .to_owned(),
        )
        .exec(db)
        .await;
    match res {
        Ok(_) | Err(DbErr::RecordNotInserted) => {}
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
