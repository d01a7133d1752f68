//! Server → client messages.
//!
//! Inbound traffic is a strict tagged union on `type`. Anything that does
//! not match one of these shapes fails to decode, so the session layer
//! never has to guess at fields.
//!
//! ```text
//! PONG              keepalive reply
//! ACK               "your intent went through", plus the new state
//! EVENT             broadcast: something happened in the game
//! DISPROVE_REQUEST  "show a card" (check `disprover` before acting)
//! ERROR             the server refused something
//! ```

use serde::{Deserialize, Serialize};

use crate::{CardList, GameId, GameSnapshot, IntentKind, LobbySnapshot, PlayerId, ProtocolError};

/// Outcome of an accusation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccusationResult {
    Win,
    Lose,
}

/// Everything the server can send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    Pong {
        #[serde(default)]
        payload: Option<String>,
    },
    Ack(Ack),
    Event(Event),
    DisproveRequest(DisproveRequest),
    Error {
        #[serde(default)]
        message: String,
    },
}

impl ServerMessage {
    /// Checks rules that serde alone can't express.
    ///
    /// # Errors
    /// [`ProtocolError::InvalidMessage`] for a disprove request with no
    /// disprover, or a game snapshot that breaks its invariants.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        match self {
            Self::Ack(ack) => ack.state.as_ref().map_or(Ok(()), GameSnapshot::validate),
            Self::Event(event) => {
                event.state.as_ref().map_or(Ok(()), GameSnapshot::validate)
            }
            Self::DisproveRequest(req) if req.disprover.as_str().is_empty() => {
                Err(ProtocolError::InvalidMessage(
                    "disprove request without a disprover".into(),
                ))
            }
            Self::DisproveRequest(_) | Self::Pong { .. } | Self::Error { .. } => Ok(()),
        }
    }

    /// The game snapshot carried by this message, if any.
    pub fn game_snapshot(&self) -> Option<&GameSnapshot> {
        match self {
            Self::Ack(ack) => ack.state.as_ref(),
            Self::Event(event) => event.state.as_ref(),
            _ => None,
        }
    }

    /// The lobby snapshot carried by this message, if any.
    pub fn lobby_snapshot(&self) -> Option<&LobbySnapshot> {
        match self {
            Self::Ack(ack) => ack.lobby.as_ref(),
            Self::Event(event) => event.lobby.as_ref(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ACK
// ---------------------------------------------------------------------------

/// Acknowledgment of one of this client's intents.
///
/// Which optional fields are present depends on `acknowledges`: a SUGGEST
/// ack carries the private disprove outcome, an ACCUSE ack the verdict,
/// and so on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ack {
    #[serde(rename = "for")]
    pub acknowledges: IntentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_id: Option<GameId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_id: Option<PlayerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lobby: Option<LobbySnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<GameSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hallway: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspect: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weapon: Option<String>,
    /// Empty string when nobody could disprove.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disprover: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revealed_card: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<AccusationResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eliminated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_over: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<PlayerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_players: Option<bool>,
}

impl Ack {
    /// A bare acknowledgment with every optional field empty.
    pub fn of(kind: IntentKind) -> Self {
        Self {
            acknowledges: kind,
            game_id: None,
            player_id: None,
            lobby: None,
            state: None,
            room: None,
            hallway: None,
            suspect: None,
            weapon: None,
            disprover: None,
            revealed_card: None,
            result: None,
            eliminated: None,
            game_over: None,
            winner: None,
            keep_players: None,
        }
    }
}

// ---------------------------------------------------------------------------
// EVENT
// ---------------------------------------------------------------------------

/// What a broadcast is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Join,
    LobbyJoin,
    CharacterSelected,
    CharacterUnselected,
    ReadyChanged,
    StartGame,
    Move,
    MoveToHallway,
    MoveFromHallway,
    Suggest,
    Accuse,
    Turn,
    NewGame,
    DisproveReveal,
    DisproveDone,
}

impl EventKind {
    /// Events whose main purpose is a new lobby snapshot.
    pub fn is_lobby_event(&self) -> bool {
        matches!(
            self,
            Self::LobbyJoin
                | Self::CharacterSelected
                | Self::CharacterUnselected
                | Self::ReadyChanged
        )
    }

    /// The movement events.
    pub fn is_move(&self) -> bool {
        matches!(self, Self::Move | Self::MoveToHallway | Self::MoveFromHallway)
    }
}

/// A broadcast notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub event: EventKind,
    /// The acting player.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_id: Option<PlayerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lobby: Option<LobbySnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<GameSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hallway: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspect: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weapon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggester: Option<PlayerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disprover: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<String>,
    /// Older servers name the shown card `revealedCard`. See
    /// [`Event::shown_card`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revealed_card: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<AccusationResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_over: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<PlayerId>,
    /// The accuser, on ACCUSE.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by: Option<PlayerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_players: Option<bool>,
}

impl Event {
    /// A bare event with every optional field empty.
    pub fn of(kind: EventKind) -> Self {
        Self {
            event: kind,
            player_id: None,
            lobby: None,
            state: None,
            room: None,
            hallway: None,
            suspect: None,
            weapon: None,
            suggester: None,
            disprover: None,
            card: None,
            revealed_card: None,
            result: None,
            game_over: None,
            winner: None,
            by: None,
            keep_players: None,
        }
    }

    /// The card a disprover showed: `card` if set and non-empty, else
    /// `revealedCard`.
    pub fn shown_card(&self) -> Option<&str> {
        [self.card.as_deref(), self.revealed_card.as_deref()]
            .into_iter()
            .flatten()
            .find(|c| !c.is_empty())
    }
}

// ---------------------------------------------------------------------------
// DISPROVE_REQUEST
// ---------------------------------------------------------------------------

/// "Show the suggester one of these cards."
///
/// May be delivered to every client; only the one whose id equals
/// `disprover` should act on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisproveRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_id: Option<GameId>,
    pub disprover: PlayerId,
    pub suggester: PlayerId,
    pub suspect: String,
    pub weapon: String,
    pub room: String,
    #[serde(default)]
    pub candidate_cards: CardList,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> ServerMessage {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_pong_decodes_payload() {
        assert_eq!(
            decode(r#"{"type":"PONG","payload":"ok"}"#),
            ServerMessage::Pong {
                payload: Some("ok".into())
            }
        );
    }

    #[test]
    fn test_ack_for_join_lobby_carries_lobby() {
        let msg = decode(
            r#"{"type":"ACK","for":"JOIN_LOBBY","gameId":"g1","playerId":"p1",
                "lobby":{"gameId":"g1","started":false,"players":["p1"],
                         "selections":{},"available":["GREEN"],"ready":{}}}"#,
        );
        let ServerMessage::Ack(ack) = &msg else {
            panic!("expected ACK, got {msg:?}");
        };
        assert_eq!(ack.acknowledges, IntentKind::JoinLobby);
        assert_eq!(ack.player_id, Some(PlayerId::from("p1")));
        assert_eq!(msg.lobby_snapshot().unwrap().players.len(), 1);
        assert!(msg.game_snapshot().is_none());
    }

    #[test]
    fn test_ack_for_accuse_carries_verdict() {
        let msg = decode(
            r#"{"type":"ACK","for":"ACCUSE","result":"LOSE","eliminated":true,
                "gameOver":false,"winner":null}"#,
        );
        let ServerMessage::Ack(ack) = msg else {
            panic!("expected ACK");
        };
        assert_eq!(ack.result, Some(AccusationResult::Lose));
        assert_eq!(ack.eliminated, Some(true));
        assert_eq!(ack.winner, None);
    }

    #[test]
    fn test_event_suggest_fields() {
        let msg = decode(
            r#"{"type":"EVENT","event":"SUGGEST","playerId":"p1","suspect":"PLUM",
                "weapon":"ROPE","room":"HALL","disprover":"p2"}"#,
        );
        let ServerMessage::Event(event) = msg else {
            panic!("expected EVENT");
        };
        assert_eq!(event.event, EventKind::Suggest);
        assert_eq!(event.disprover.as_deref(), Some("p2"));
    }

    #[test]
    fn test_event_disprove_reveal_accepts_revealed_card_key() {
        let msg = decode(
            r#"{"type":"EVENT","event":"DISPROVE_REVEAL","suggester":"p1",
                "disprover":"p2","revealedCard":"Rope"}"#,
        );
        let ServerMessage::Event(event) = msg else {
            panic!("expected EVENT");
        };
        assert_eq!(event.shown_card(), Some("Rope"));
    }

    #[test]
    fn test_event_with_both_card_keys_prefers_card() {
        let msg = decode(
            r#"{"type":"EVENT","event":"DISPROVE_REVEAL","suggester":"p1",
                "disprover":"p2","card":"Knife","revealedCard":"Rope"}"#,
        );
        let ServerMessage::Event(event) = msg else {
            panic!("expected EVENT");
        };
        assert_eq!(event.shown_card(), Some("Knife"));
    }

    #[test]
    fn test_event_empty_card_falls_back_to_revealed_card() {
        let mut event = Event::of(EventKind::DisproveReveal);
        event.card = Some(String::new());
        event.revealed_card = Some("Rope".into());
        assert_eq!(event.shown_card(), Some("Rope"));
    }

    #[test]
    fn test_disprove_request_null_candidates_is_empty_list() {
        let msg = decode(
            r#"{"type":"DISPROVE_REQUEST","disprover":"p2","suggester":"p1",
                "suspect":"PLUM","weapon":"ROPE","room":"HALL","candidateCards":null}"#,
        );
        let ServerMessage::DisproveRequest(request) = msg else {
            panic!("expected DISPROVE_REQUEST");
        };
        assert!(request.candidate_cards.is_empty());
    }

    #[test]
    fn test_disprove_request_splits_candidates() {
        let msg = decode(
            r#"{"type":"DISPROVE_REQUEST","gameId":"g1","disprover":"p2","suggester":"p1",
                "suspect":"PLUM","weapon":"ROPE","room":"HALL","candidateCards":"ROPE,HALL"}"#,
        );
        let ServerMessage::DisproveRequest(req) = msg else {
            panic!("expected DISPROVE_REQUEST");
        };
        assert_eq!(req.candidate_cards.0, vec!["ROPE", "HALL"]);
    }

    #[test]
    fn test_error_decodes_message() {
        assert_eq!(
            decode(r#"{"type":"ERROR","message":"Not your turn"}"#),
            ServerMessage::Error {
                message: "Not your turn".into()
            }
        );
    }

    #[test]
    fn test_unknown_type_fails() {
        assert!(serde_json::from_str::<ServerMessage>(r#"{"type":"HELLO"}"#).is_err());
    }

    #[test]
    fn test_unknown_event_fails() {
        assert!(
            serde_json::from_str::<ServerMessage>(r#"{"type":"EVENT","event":"DANCE"}"#)
                .is_err()
        );
    }

    #[test]
    fn test_validate_rejects_empty_disprover() {
        let msg = decode(
            r#"{"type":"DISPROVE_REQUEST","disprover":"","suggester":"p1",
                "suspect":"a","weapon":"b","room":"c","candidateCards":""}"#,
        );
        assert!(matches!(msg.validate(), Err(ProtocolError::InvalidMessage(_))));
    }

    #[test]
    fn test_event_kind_groups() {
        assert!(EventKind::ReadyChanged.is_lobby_event());
        assert!(!EventKind::StartGame.is_lobby_event());
        assert!(EventKind::MoveFromHallway.is_move());
        assert!(!EventKind::Turn.is_move());
    }
}
