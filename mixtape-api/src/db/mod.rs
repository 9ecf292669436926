//! Database access for the playlist catalog
//!
//! Each entity gets its own module of free async functions. Functions that
//! take part in multi-step writes accept `&mut SqliteConnection` so callers
//! can compose them on one transaction; pool-level reads take `&SqlitePool`.

pub mod albums;
pub mod artist_albums;
pub mod artist_songs;
pub mod artists;
pub mod playlist_songs;
pub mod playlists;
pub mod songs;
