use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    // SQLite leaves foreign keys off unless asked per connection
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "PRAGMA foreign_keys = ON".to_owned(),
    ))
    .await?;

    // Run migrations manually (simple SQL)
    run_migrations(&db).await?;

    Ok(db)
}

async fn execute(db: &DatabaseConnection, sql: &str) -> Result<(), DbErr> {
    db.execute(Statement::from_string(db.get_database_backend(), sql.to_owned()))
        .await
        .map(|_| ())
}

async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Platform users
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'fan'
                CHECK (role IN ('fan', 'artist', 'organiser', 'venue')),
            profile_picture TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS artists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            genre TEXT,
            bio TEXT,
            location TEXT,
            website TEXT,
            profile_picture TEXT,
            gallery TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        )
        "#,
    )
    .await?;
    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_artists_user_id ON artists(user_id)",
    )
    .await?;
    execute(db, "CREATE INDEX IF NOT EXISTS idx_artists_genre ON artists(genre)").await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS venues (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            address TEXT,
            city TEXT,
            capacity INTEGER CHECK (capacity IS NULL OR capacity > 0),
            description TEXT,
            website TEXT,
            profile_picture TEXT,
            gallery TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        )
        "#,
    )
    .await?;
    execute(db, "CREATE INDEX IF NOT EXISTS idx_venues_user_id ON venues(user_id)").await?;
    execute(db, "CREATE INDEX IF NOT EXISTS idx_venues_city ON venues(city)").await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            organiser_id INTEGER NOT NULL,
            venue_id INTEGER,
            name TEXT NOT NULL,
            description TEXT,
            starts_at TEXT NOT NULL,
            ends_at TEXT,
            ticket_price REAL CHECK (ticket_price IS NULL OR ticket_price >= 0),
            ticket_url TEXT,
            profile_picture TEXT,
            gallery TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (organiser_id) REFERENCES users(id) ON DELETE CASCADE,
            FOREIGN KEY (venue_id) REFERENCES venues(id) ON DELETE SET NULL
        )
        "#,
    )
    .await?;
    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_events_starts_at ON events(starts_at)",
    )
    .await?;
    execute(db, "CREATE INDEX IF NOT EXISTS idx_events_venue_id ON events(venue_id)").await?;
    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_events_organiser_id ON events(organiser_id)",
    )
    .await?;

    // Lineup junction table
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS event_artists (
            event_id INTEGER NOT NULL,
            artist_id INTEGER NOT NULL,
            PRIMARY KEY (event_id, artist_id),
            FOREIGN KEY (event_id) REFERENCES events(id) ON DELETE CASCADE,
            FOREIGN KEY (artist_id) REFERENCES artists(id) ON DELETE CASCADE
        )
        "#,
    )
    .await?;
    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_event_artists_artist_id ON event_artists(artist_id)",
    )
    .await?;

    // Ratings: one row per (user, rateable). rateable_id is polymorphic, so no FK on it.
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS ratings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            rateable_id INTEGER NOT NULL,
            rateable_type TEXT NOT NULL
                CHECK (rateable_type IN ('artist', 'event', 'venue', 'organiser')),
            score INTEGER NOT NULL CHECK (score BETWEEN 1 AND 5),
            review TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        )
        "#,
    )
    .await?;
    execute(
        db,
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_ratings_user_rateable
        ON ratings(user_id, rateable_id, rateable_type)
        "#,
    )
    .await?;
    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_ratings_rateable ON ratings(rateable_type, rateable_id)",
    )
    .await?;

    // Back-office accounts
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS majesty (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            email TEXT,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'admin' CHECK (role IN ('admin', 'owner')),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS paid_features (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE COLLATE NOCASE,
            description TEXT,
            price REAL NOT NULL DEFAULT 0 CHECK (price >= 0),
            duration_days INTEGER NOT NULL CHECK (duration_days >= 1),
            target_type TEXT NOT NULL CHECK (target_type IN ('artist', 'venue', 'event')),
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS purchased_feature (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            paid_feature_id INTEGER NOT NULL,
            user_id INTEGER NOT NULL,
            target_type TEXT NOT NULL CHECK (target_type IN ('artist', 'venue', 'event')),
            target_id INTEGER NOT NULL,
            amount REAL NOT NULL DEFAULT 0,
            purchased_at TEXT NOT NULL,
            expires_at TEXT NOT NULL,
            FOREIGN KEY (paid_feature_id) REFERENCES paid_features(id) ON DELETE CASCADE,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        )
        "#,
    )
    .await?;
    execute(
        db,
        r#"
        CREATE INDEX IF NOT EXISTS idx_purchased_feature_target_expiry
        ON purchased_feature(target_type, expires_at)
        "#,
    )
    .await?;
    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_purchased_feature_user_id ON purchased_feature(user_id)",
    )
    .await?;

    Ok(())
}
