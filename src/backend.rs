use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::api::ApiClient;
use crate::error::{LyricFlipError, Result};
use crate::songs::Genre;

/// Minimum gap between two answer submissions. Enforced locally, before
/// any backend round-trip.
pub const MIN_SUBMIT_GAP: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundInfo {
    pub id: u64,
    pub genre: String,
    pub state: String,
    pub players: u32,
    pub cards_per_round: u32,
    pub wager_amount: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LyricCard {
    pub lyric: String,
    pub options: Vec<CardOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardOption {
    pub title: String,
    pub artist: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnswerResult {
    pub correct: bool,
    pub score: u32,
}

/// The multiplayer backend as an opaque capability. The wire protocol and
/// wager settlement behind these calls are the backend's business; clients
/// only see this surface.
pub trait GameBackend {
    fn create_round(&self, genre: Genre, wager_amount: u64) -> Result<RoundInfo>;
    fn join_round(&self, round_id: u64) -> Result<RoundInfo>;
    fn start_round(&self, round_id: u64) -> Result<()>;
    fn get_round(&self, round_id: u64) -> Result<RoundInfo>;
    fn submit_answer(&self, round_id: u64, answer_title: &str) -> Result<AnswerResult>;
    fn next_card(&self, round_id: u64) -> Result<LyricCard>;
    fn is_round_player(&self, round_id: u64, player: &str) -> Result<bool>;
    fn set_cards_per_round(&self, round_id: u64, cards: u32) -> Result<()>;
}

#[derive(Serialize)]
struct CreateRoundBody<'a> {
    genre: &'a str,
    wager_amount: u64,
}

#[derive(Serialize)]
struct SubmitAnswerBody<'a> {
    answer: &'a str,
}

#[derive(Serialize)]
struct CardsPerRoundBody {
    cards: u32,
}

#[derive(Deserialize)]
struct PlayerMembership {
    is_player: bool,
}

/// HTTP implementation of [`GameBackend`] over the [`ApiClient`] wrapper.
#[derive(Debug, Clone)]
pub struct HttpGameBackend {
    api: ApiClient,
}

impl HttpGameBackend {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

impl GameBackend for HttpGameBackend {
    fn create_round(&self, genre: Genre, wager_amount: u64) -> Result<RoundInfo> {
        let genre = genre.to_string().to_lowercase();
        self.api.post(
            "/rounds",
            &CreateRoundBody {
                genre: &genre,
                wager_amount,
            },
            None,
        )
    }

    fn join_round(&self, round_id: u64) -> Result<RoundInfo> {
        self.api
            .post(&format!("/rounds/{round_id}/join"), &serde_json::json!({}), None)
    }

    fn start_round(&self, round_id: u64) -> Result<()> {
        let _: serde_json::Value =
            self.api
                .post(&format!("/rounds/{round_id}/start"), &serde_json::json!({}), None)?;
        Ok(())
    }

    fn get_round(&self, round_id: u64) -> Result<RoundInfo> {
        self.api.get(&format!("/rounds/{round_id}"), None)
    }

    fn submit_answer(&self, round_id: u64, answer_title: &str) -> Result<AnswerResult> {
        self.api.post(
            &format!("/rounds/{round_id}/answers"),
            &SubmitAnswerBody {
                answer: answer_title,
            },
            None,
        )
    }

    fn next_card(&self, round_id: u64) -> Result<LyricCard> {
        self.api.post(
            &format!("/rounds/{round_id}/cards/next"),
            &serde_json::json!({}),
            None,
        )
    }

    fn is_round_player(&self, round_id: u64, player: &str) -> Result<bool> {
        let membership: PlayerMembership = self
            .api
            .get(&format!("/rounds/{round_id}/players/{player}"), None)?;
        Ok(membership.is_player)
    }

    fn set_cards_per_round(&self, round_id: u64, cards: u32) -> Result<()> {
        let _: serde_json::Value = self.api.put(
            &format!("/rounds/{round_id}/cards-per-round"),
            &CardsPerRoundBody { cards },
            None,
        )?;
        Ok(())
    }
}

/// Rate limit on answer submissions.
#[derive(Debug, Default)]
pub struct SubmitWindow {
    last: Option<Instant>,
}

impl SubmitWindow {
    /// Accept or reject a submission at `now`. On acceptance the window
    /// restarts from `now`.
    pub fn try_begin(&mut self, now: Instant) -> Result<()> {
        if let Some(last) = self.last {
            let since = now.duration_since(last);
            if since < MIN_SUBMIT_GAP {
                let remaining = MIN_SUBMIT_GAP - since;
                return Err(LyricFlipError::SubmitTooSoon {
                    remaining_ms: remaining.as_millis() as u64,
                });
            }
        }
        self.last = Some(now);
        Ok(())
    }
}

/// The backend as held by the app: possibly absent (offline mode, failed
/// wallet/account setup), checked before every call.
pub struct BackendSession {
    backend: Option<Box<dyn GameBackend>>,
    submits: SubmitWindow,
}

impl std::fmt::Debug for BackendSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendSession")
            .field("initialized", &self.backend.is_some())
            .finish()
    }
}

impl BackendSession {
    pub fn uninitialized() -> Self {
        Self {
            backend: None,
            submits: SubmitWindow::default(),
        }
    }

    pub fn new(backend: Box<dyn GameBackend>) -> Self {
        Self {
            backend: Some(backend),
            submits: SubmitWindow::default(),
        }
    }

    pub fn initialize(&mut self, backend: Box<dyn GameBackend>) {
        self.backend = Some(backend);
    }

    pub fn is_initialized(&self) -> bool {
        self.backend.is_some()
    }

    fn backend(&self) -> Result<&dyn GameBackend> {
        self.backend
            .as_deref()
            .ok_or(LyricFlipError::BackendNotInitialized)
    }

    pub fn create_round(&self, genre: Genre, wager_amount: u64) -> Result<RoundInfo> {
        self.backend()?.create_round(genre, wager_amount)
    }

    pub fn join_round(&self, round_id: u64) -> Result<RoundInfo> {
        self.backend()?.join_round(round_id)
    }

    pub fn start_round(&self, round_id: u64) -> Result<()> {
        self.backend()?.start_round(round_id)
    }

    pub fn get_round(&self, round_id: u64) -> Result<RoundInfo> {
        self.backend()?.get_round(round_id)
    }

    /// Submit an answer, enforcing the local minimum gap first. A rejected
    /// submission never reaches the backend.
    pub fn submit_answer(&mut self, round_id: u64, answer_title: &str) -> Result<AnswerResult> {
        let backend = self
            .backend
            .as_deref()
            .ok_or(LyricFlipError::BackendNotInitialized)?;
        self.submits.try_begin(Instant::now())?;
        backend.submit_answer(round_id, answer_title)
    }

    pub fn next_card(&self, round_id: u64) -> Result<LyricCard> {
        self.backend()?.next_card(round_id)
    }

    pub fn is_round_player(&self, round_id: u64, player: &str) -> Result<bool> {
        self.backend()?.is_round_player(round_id, player)
    }

    pub fn set_cards_per_round(&self, round_id: u64, cards: u32) -> Result<()> {
        self.backend()?.set_cards_per_round(round_id, cards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct RecordingBackend {
        calls: Rc<RefCell<Vec<String>>>,
    }

    impl GameBackend for RecordingBackend {
        fn create_round(&self, genre: Genre, wager_amount: u64) -> Result<RoundInfo> {
            self.calls
                .borrow_mut()
                .push(format!("create {genre} {wager_amount}"));
            Ok(RoundInfo {
                id: 1,
                genre: genre.to_string().to_lowercase(),
                state: "waiting".into(),
                players: 1,
                cards_per_round: 5,
                wager_amount,
            })
        }

        fn join_round(&self, round_id: u64) -> Result<RoundInfo> {
            self.calls.borrow_mut().push(format!("join {round_id}"));
            Ok(RoundInfo {
                id: round_id,
                genre: "pop".into(),
                state: "waiting".into(),
                players: 2,
                cards_per_round: 5,
                wager_amount: 0,
            })
        }

        fn start_round(&self, round_id: u64) -> Result<()> {
            self.calls.borrow_mut().push(format!("start {round_id}"));
            Ok(())
        }

        fn get_round(&self, round_id: u64) -> Result<RoundInfo> {
            self.join_round(round_id)
        }

        fn submit_answer(&self, round_id: u64, answer_title: &str) -> Result<AnswerResult> {
            self.calls
                .borrow_mut()
                .push(format!("answer {round_id} {answer_title}"));
            Ok(AnswerResult {
                correct: true,
                score: 10,
            })
        }

        fn next_card(&self, _round_id: u64) -> Result<LyricCard> {
            Ok(LyricCard {
                lyric: "la".into(),
                options: vec![],
            })
        }

        fn is_round_player(&self, _round_id: u64, _player: &str) -> Result<bool> {
            Ok(true)
        }

        fn set_cards_per_round(&self, round_id: u64, cards: u32) -> Result<()> {
            self.calls
                .borrow_mut()
                .push(format!("cards {round_id} {cards}"));
            Ok(())
        }
    }

    #[test]
    fn uninitialized_session_rejects_every_call() {
        let session = BackendSession::uninitialized();
        assert!(matches!(
            session.create_round(Genre::Pop, 0),
            Err(LyricFlipError::BackendNotInitialized)
        ));
        assert!(matches!(
            session.get_round(1),
            Err(LyricFlipError::BackendNotInitialized)
        ));
        assert!(matches!(
            session.next_card(1),
            Err(LyricFlipError::BackendNotInitialized)
        ));
    }

    #[test]
    fn uninitialized_submit_fails_before_throttle() {
        let mut session = BackendSession::uninitialized();
        assert!(matches!(
            session.submit_answer(1, "Song"),
            Err(LyricFlipError::BackendNotInitialized)
        ));
    }

    #[test]
    fn initialized_session_delegates() {
        let mut session = BackendSession::new(Box::new(RecordingBackend::default()));
        let round = session.create_round(Genre::Rock, 50).unwrap();
        assert_eq!(round.wager_amount, 50);
        assert!(session.submit_answer(round.id, "Gasoline Choir").is_ok());
    }

    #[test]
    fn submit_window_enforces_minimum_gap() {
        let mut window = SubmitWindow::default();
        let t0 = Instant::now();

        assert!(window.try_begin(t0).is_ok());

        let too_soon = window.try_begin(t0 + Duration::from_millis(500));
        match too_soon {
            Err(LyricFlipError::SubmitTooSoon { remaining_ms }) => {
                assert!(remaining_ms > 0 && remaining_ms <= 1500);
            }
            other => panic!("expected SubmitTooSoon, got {other:?}"),
        }

        assert!(window.try_begin(t0 + MIN_SUBMIT_GAP).is_ok());
    }

    #[test]
    fn rejected_submit_does_not_restart_the_window() {
        let mut window = SubmitWindow::default();
        let t0 = Instant::now();

        window.try_begin(t0).unwrap();
        let _ = window.try_begin(t0 + Duration::from_millis(1900));
        // 2s after the accepted submission, not after the rejected one
        assert!(window.try_begin(t0 + Duration::from_secs(2)).is_ok());
    }

    #[test]
    fn throttled_submit_never_reaches_the_backend() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let backend = RecordingBackend {
            calls: Rc::clone(&calls),
        };
        let mut session = BackendSession::new(Box::new(backend));

        session.submit_answer(1, "a").unwrap();
        let second = session.submit_answer(1, "b");
        assert!(matches!(second, Err(LyricFlipError::SubmitTooSoon { .. })));
        assert_eq!(calls.borrow().len(), 1);
    }
}
