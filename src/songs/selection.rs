use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{LyricFlipError, Result};
use crate::songs::{Song, SongBook};

/// Options shown per prompt, including the correct one.
pub const OPTIONS_PER_PROMPT: usize = 4;

/// One candidate answer: the (title, artist) pair shown to the player.
#[derive(Debug, Clone, PartialEq)]
pub struct SongChoice {
    pub title: String,
    pub artist: String,
}

impl From<&Song> for SongChoice {
    fn from(song: &Song) -> Self {
        Self {
            title: song.title.clone(),
            artist: song.artist.clone(),
        }
    }
}

/// A lyric snippet with its answer set. Exactly one option matches
/// `title`/`artist`.
#[derive(Debug, Clone)]
pub struct RoundPrompt {
    pub lyric: String,
    pub title: String,
    pub artist: String,
    pub options: Vec<SongChoice>,
}

impl RoundPrompt {
    pub fn correct_choice(&self) -> SongChoice {
        SongChoice {
            title: self.title.clone(),
            artist: self.artist.clone(),
        }
    }
}

/// Draw one prompt uniformly at random from the book, with decoys pulled
/// from the rest of the pack and the option order shuffled.
pub fn draw_prompt<R: Rng>(book: &SongBook, rng: &mut R) -> Result<RoundPrompt> {
    if book.songs.len() < OPTIONS_PER_PROMPT {
        return Err(LyricFlipError::PackTooSmall {
            genre: book.name.clone(),
            needed: OPTIONS_PER_PROMPT,
        });
    }

    let song = book
        .songs
        .choose(rng)
        .ok_or_else(|| LyricFlipError::PackTooSmall {
            genre: book.name.clone(),
            needed: OPTIONS_PER_PROMPT,
        })?;

    let decoys = book
        .songs
        .iter()
        .filter(|s| s.title != song.title)
        .unique_by(|s| s.title.clone())
        .collect::<Vec<_>>();

    let mut options: Vec<SongChoice> = decoys
        .choose_multiple(rng, OPTIONS_PER_PROMPT - 1)
        .map(|s| SongChoice::from(*s))
        .collect();
    options.push(SongChoice::from(song));
    options.shuffle(rng);

    Ok(RoundPrompt {
        lyric: song.lyric.clone(),
        title: song.title.clone(),
        artist: song.artist.clone(),
        options,
    })
}
