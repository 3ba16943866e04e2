pub mod cipher;
pub mod clib;
pub mod error;
pub mod game;
pub mod reader;
pub mod writer;

pub use clib::{ClibArchive, ClibBuilder, ClibEntry, EntryStream, MasterHeader};
pub use error::{Error, ErrorKind, Result};
pub use game::{GameDataVersion, GameFeatures, GameModel};
