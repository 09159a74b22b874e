pub mod album;
pub mod artist;
pub mod track;

pub use album::Album;
pub use artist::Artist;
pub use track::{is_partial_date, Track};
