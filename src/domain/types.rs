//! Closed vocabularies stored as TEXT columns

use std::fmt;
use std::str::FromStr;

use super::DomainError;

macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident, $what:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(DomainError::Validation(format!(
                        "Invalid {} '{}'. Must be one of: {}",
                        $what,
                        other,
                        [$($text),+].join(", ")
                    ))),
                }
            }
        }
    };
}

text_enum!(
    /// Role chosen by a platform user at registration
    UserRole, "role" {
        Fan => "fan",
        Artist => "artist",
        Organiser => "organiser",
        Venue => "venue",
    }
);

text_enum!(
    /// Role of a `majesty` (back-office) account
    MajestyRole, "admin role" {
        Admin => "admin",
        Owner => "owner",
    }
);

text_enum!(
    /// What a rating points at
    RateableType, "rateable type" {
        Artist => "artist",
        Event => "event",
        Venue => "venue",
        Organiser => "organiser",
    }
);

text_enum!(
    /// Public listings that carry images and can be promoted
    ListingKind, "listing type" {
        Artist => "artist",
        Venue => "venue",
        Event => "event",
    }
);

text_enum!(
    /// Purchase filter used by the admin dashboard
    PurchaseStatus, "status" {
        Active => "active",
        Expired => "expired",
        All => "all",
    }
);

/// Owner of a set of stored images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    User,
    Listing(ListingKind),
}

impl MediaKind {
    /// Folder segment for the owner's upload directory; users have none
    pub fn segment(&self) -> Option<&'static str> {
        match self {
            MediaKind::User => None,
            MediaKind::Listing(ListingKind::Artist) => Some("artists"),
            MediaKind::Listing(ListingKind::Venue) => Some("venues"),
            MediaKind::Listing(ListingKind::Event) => Some("events"),
        }
    }
}

impl From<ListingKind> for MediaKind {
    fn from(kind: ListingKind) -> Self {
        MediaKind::Listing(kind)
    }
}

impl UserRole {
    /// Listing type this role is allowed to create, if any
    pub fn creates(&self) -> Option<ListingKind> {
        match self {
            UserRole::Artist => Some(ListingKind::Artist),
            UserRole::Venue => Some(ListingKind::Venue),
            UserRole::Organiser => Some(ListingKind::Event),
            UserRole::Fan => None,
        }
    }
}
