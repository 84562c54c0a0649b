//! Wire-level request/response shapes, kept distinct from the engine's
//! internal types (spec §6.1). Requests are parsed from `serde_json::Value`
//! by hand rather than via `#[derive(Deserialize)]` so a missing or
//! mistyped field produces the exact `EngineError` schema variant the spec
//! calls for, instead of axum's generic JSON-rejection body.

use crate::core_types::{OrderId, PlayerId, Side, Suit};
use crate::error::EngineError;
use crate::round::{Action, ActionResult, CancelRequest, CancelSide, CancelSuit, Trade};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct PlayerQuery {
    pub player_id: Option<String>,
}

pub fn parse_player_id(raw: Option<String>) -> Result<PlayerId, EngineError> {
    let raw = raw.ok_or(EngineError::MissingField("player_id"))?;
    raw.parse::<uuid::Uuid>()
        .map(PlayerId)
        .map_err(|_| EngineError::MalformedPlayerId)
}

#[derive(Debug, Serialize)]
pub struct JoinResponse {
    pub player_id: PlayerId,
}

fn field<'a>(value: &'a Value, name: &'static str) -> Result<&'a Value, EngineError> {
    value.get(name).ok_or(EngineError::MissingField(name))
}

fn str_field<'a>(value: &'a Value, name: &'static str) -> Result<&'a str, EngineError> {
    field(value, name)?
        .as_str()
        .ok_or(EngineError::MissingField(name))
}

fn int_field(value: &Value, name: &'static str) -> Result<i64, EngineError> {
    field(value, name)?
        .as_i64()
        .ok_or(EngineError::MissingField(name))
}

pub fn parse_join_name(value: &Value) -> Result<String, EngineError> {
    Ok(str_field(value, "name")?.to_string())
}

fn parse_suit(raw: &str) -> Result<Suit, EngineError> {
    match raw {
        "spades" => Ok(Suit::Spades),
        "clubs" => Ok(Suit::Clubs),
        "hearts" => Ok(Suit::Hearts),
        "diamonds" => Ok(Suit::Diamonds),
        other => Err(EngineError::UnknownSuit(other.to_string())),
    }
}

/// Parse a `POST /action` body into the internal `Action` the round
/// understands. The wire shape is `{"action": "order"|"cancel", ...}`.
pub fn parse_action(value: &Value) -> Result<Action, EngineError> {
    match str_field(value, "action")? {
        "order" => {
            let side = match str_field(value, "side")? {
                "buy" => Side::Buy,
                "sell" => Side::Sell,
                other => return Err(EngineError::UnknownOrderType(other.to_string())),
            };
            let suit = parse_suit(str_field(value, "suit")?)?;
            let price = int_field(value, "price")?;
            Ok(Action::Order { side, suit, price })
        }
        "cancel" => {
            let side = match str_field(value, "order_type")? {
                "buy" => CancelSide::Buy,
                "sell" => CancelSide::Sell,
                "both" => CancelSide::Both,
                other => return Err(EngineError::UnknownOrderType(other.to_string())),
            };
            let suit_raw = str_field(value, "suit")?;
            let suit = if suit_raw == "all" {
                CancelSuit::All
            } else {
                CancelSuit::One(parse_suit(suit_raw)?)
            };
            let price = int_field(value, "price")?;
            Ok(Action::Cancel(CancelRequest { side, suit, price }))
        }
        other => Err(EngineError::UnknownAction(other.to_string())),
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ActionResponse {
    Rested { order_id: OrderId },
    Traded { trade: Trade },
    Canceled { canceled: Vec<OrderId> },
}

impl From<ActionResult> for ActionResponse {
    fn from(result: ActionResult) -> Self {
        match result {
            ActionResult::Rested { order_id } => ActionResponse::Rested { order_id },
            ActionResult::Traded { trade } => ActionResponse::Traded { trade },
            ActionResult::Canceled { order_ids } => ActionResponse::Canceled {
                canceled: order_ids,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_an_order_action() {
        let value = json!({"action": "order", "side": "buy", "suit": "spades", "price": 10});
        let action = parse_action(&value).unwrap();
        assert!(matches!(
            action,
            Action::Order { side: Side::Buy, suit: Suit::Spades, price: 10 }
        ));
    }

    #[test]
    fn parses_a_bulk_cancel_action() {
        let value = json!({"action": "cancel", "order_type": "both", "suit": "all", "price": -1});
        let action = parse_action(&value).unwrap();
        match action {
            Action::Cancel(req) => {
                assert!(matches!(req.side, CancelSide::Both));
                assert!(matches!(req.suit, CancelSuit::All));
                assert_eq!(req.price, -1);
            }
            other => panic!("expected a cancel action, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_suit() {
        let value = json!({"action": "order", "side": "buy", "suit": "wands", "price": 10});
        assert_eq!(
            parse_action(&value).unwrap_err(),
            EngineError::UnknownSuit("wands".to_string())
        );
    }

    #[test]
    fn rejects_missing_field() {
        let value = json!({"action": "order", "side": "buy", "price": 10});
        assert_eq!(
            parse_action(&value).unwrap_err(),
            EngineError::MissingField("suit")
        );
    }
}
