pub mod selection;

use clap::ValueEnum;
use include_dir::{include_dir, Dir};
use serde::Deserialize;
use serde_json::from_str;

use crate::error::{LyricFlipError, Result};

static PACK_DIR: Dir = include_dir!("src/songs/data");

/// Genres with an embedded song pack.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display)]
pub enum Genre {
    Pop,
    Rock,
    HipHop,
    Rnb,
}

impl Genre {
    fn pack_name(&self) -> String {
        self.to_string().to_lowercase()
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Song {
    pub title: String,
    pub artist: String,
    pub lyric: String,
}

/// One genre's worth of songs, deserialized from the embedded pack.
#[derive(Deserialize, Clone, Debug)]
pub struct SongBook {
    pub name: String,
    pub songs: Vec<Song>,
}

impl SongBook {
    pub fn load(genre: Genre) -> Result<Self> {
        read_pack(&format!("{}.json", genre.pack_name()))
    }
}

fn read_pack(file_name: &str) -> Result<SongBook> {
    let file = PACK_DIR
        .get_file(file_name)
        .and_then(|f| f.contents_utf8())
        .ok_or_else(|| LyricFlipError::UnknownGenre {
            genre: file_name.to_string(),
        })?;

    from_str(file).map_err(|source| LyricFlipError::PackParse {
        name: file_name.to_string(),
        source,
    })
}
