//! Repository implementations using SeaORM

pub mod artist_repository;
pub mod event_repository;
pub mod media_repository;
pub mod rating_repository;
pub mod venue_repository;

pub use artist_repository::SeaOrmArtistRepository;
pub use event_repository::SeaOrmEventRepository;
pub use media_repository::SeaOrmMediaRepository;
pub use rating_repository::SeaOrmRatingRepository;
pub use venue_repository::SeaOrmVenueRepository;
