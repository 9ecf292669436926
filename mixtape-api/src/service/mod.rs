//! Service layer: composes the per-entity database operations into the
//! playlist-facing operations the HTTP surface exposes.

mod playlists;

pub use playlists::PlaylistService;
