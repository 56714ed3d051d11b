use serde_json::Value;

use crate::types::Direction;

#[derive(Debug, PartialEq)]
pub enum ParsedClientMessage {
    Input { dir: Direction },
    Start,
    Pause,
    Resume,
    Reset,
    Ping { t: f64 },
}

pub fn parse_client_message(raw: &str) -> Option<ParsedClientMessage> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let object = value.as_object()?;
    let message_type = object.get("type")?.as_str()?;

    match message_type {
        "input" => {
            let dir = Direction::parse_move(object.get("dir")?.as_str()?)?;
            Some(ParsedClientMessage::Input { dir })
        }
        "start" => Some(ParsedClientMessage::Start),
        "pause" => Some(ParsedClientMessage::Pause),
        "resume" => Some(ParsedClientMessage::Resume),
        "reset" => Some(ParsedClientMessage::Reset),
        "ping" => {
            let t = object.get("t")?.as_f64()?;
            if !t.is_finite() {
                return None;
            }
            Some(ParsedClientMessage::Ping { t })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_input_message() {
        let parsed = parse_client_message(r#"{"type":"input","dir":"up"}"#);
        assert_eq!(
            parsed,
            Some(ParsedClientMessage::Input { dir: Direction::Up })
        );
    }

    #[test]
    fn parse_input_rejects_invalid_or_missing_direction() {
        assert!(parse_client_message(r#"{"type":"input","dir":"invalid"}"#).is_none());
        assert!(parse_client_message(r#"{"type":"input","dir":3}"#).is_none());
        assert!(parse_client_message(r#"{"type":"input"}"#).is_none());
    }

    #[test]
    fn parse_input_accepts_none_direction() {
        let parsed = parse_client_message(r#"{"type":"input","dir":"none"}"#);
        assert_eq!(
            parsed,
            Some(ParsedClientMessage::Input {
                dir: Direction::None
            })
        );
    }

    #[test]
    fn parse_lifecycle_messages() {
        for (raw, expected) in [
            (r#"{"type":"start"}"#, ParsedClientMessage::Start),
            (r#"{"type":"pause"}"#, ParsedClientMessage::Pause),
            (r#"{"type":"resume"}"#, ParsedClientMessage::Resume),
            (r#"{"type":"reset"}"#, ParsedClientMessage::Reset),
        ] {
            assert_eq!(parse_client_message(raw), Some(expected));
        }
    }

    #[test]
    fn parse_ping_requires_a_number() {
        let parsed = parse_client_message(r#"{"type":"ping","t":12.5}"#);
        assert_eq!(parsed, Some(ParsedClientMessage::Ping { t: 12.5 }));
        assert!(parse_client_message(r#"{"type":"ping","t":"soon"}"#).is_none());
    }

    #[test]
    fn unknown_or_malformed_messages_are_ignored() {
        assert!(parse_client_message(r#"{"type":"teleport"}"#).is_none());
        assert!(parse_client_message(r#"["input"]"#).is_none());
        assert!(parse_client_message("not json").is_none());
    }
}
