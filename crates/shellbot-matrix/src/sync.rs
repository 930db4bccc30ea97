//! The subset of the `/sync` response the bot reads, and its conversion
//! into [`ChatEvent`]s.

use std::collections::BTreeMap;

use serde::Deserialize;
use shellbot_common::{ChatEvent, InviteEvent, MessageContent, MessageEvent, RoomId, UserId};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncResponse {
    pub next_batch: String,
    #[serde(default)]
    pub rooms: Rooms,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Rooms {
    pub join: BTreeMap<String, JoinedRoom>,
    pub invite: BTreeMap<String, InvitedRoom>,
    pub leave: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JoinedRoom {
    pub timeline: Timeline,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Timeline {
    pub events: Vec<RawEvent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InvitedRoom {
    pub invite_state: InviteState,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InviteState {
    pub events: Vec<RawEvent>,
}

/// A client event with only the fields the bot inspects.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub sender: String,
    pub state_key: Option<String>,
    pub content: serde_json::Value,
}

impl RawEvent {
    fn is_invite_for(&self, own: &UserId) -> bool {
        self.kind == "m.room.member"
            && self.state_key.as_deref() == Some(own.as_str())
            && self.content["membership"] == "invite"
    }

    fn to_message(&self, room: &str) -> Option<MessageEvent> {
        if self.kind != "m.room.message" {
            return None;
        }
        let msgtype = self.content["msgtype"].as_str().unwrap_or_default();
        let content = match (msgtype, self.content["body"].as_str()) {
            ("m.text", Some(body)) => MessageContent::Text { body: body.to_string() },
            _ => MessageContent::Other {
                msgtype: msgtype.to_string(),
            },
        };
        Some(MessageEvent {
            room: RoomId::new(room),
            sender: UserId::new(self.sender.as_str()),
            content,
        })
    }
}

impl SyncResponse {
    /// Invitations addressed to `own`, in room order.
    pub fn invites(&self, own: &UserId) -> Vec<ChatEvent> {
        self.rooms
            .invite
            .iter()
            .map(|(room, invited)| {
                let inviter = invited
                    .invite_state
                    .events
                    .iter()
                    .find(|ev| ev.is_invite_for(own))
                    .map(|ev| UserId::new(ev.sender.as_str()));
                ChatEvent::Invite(InviteEvent {
                    room: RoomId::new(room.as_str()),
                    invitee: own.clone(),
                    inviter,
                })
            })
            .collect()
    }

    /// Room messages followed by invitations.
    ///
    /// Messages keep timeline order within a room. Events sent by `own` are
    /// dropped so the bot never reads its own output back.
    pub fn events(&self, own: &UserId) -> Vec<ChatEvent> {
        let mut out = Vec::new();
        for (room, joined) in &self.rooms.join {
            out.extend(
                joined
                    .timeline
                    .events
                    .iter()
                    .filter(|ev| ev.sender != own.as_str())
                    .filter_map(|ev| ev.to_message(room))
                    .map(ChatEvent::Message),
            );
        }
        out.extend(self.invites(own));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOT: &str = "@shellbot:example.org";

    fn fixture() -> SyncResponse {
        serde_json::from_value(serde_json::json!({
            "next_batch": "s72595_4483_1934",
            "rooms": {
                "join": {
                    "!work:example.org": {
                        "timeline": {
                            "events": [
                                {
                                    "type": "m.room.message",
                                    "sender": "@alice:example.org",
                                    "event_id": "$1",
                                    "content": { "msgtype": "m.text", "body": "!shell ls" }
                                },
                                {
                                    "type": "m.room.member",
                                    "sender": "@bob:example.org",
                                    "state_key": "@bob:example.org",
                                    "content": { "membership": "join" }
                                },
                                {
                                    "type": "m.room.message",
                                    "sender": BOT,
                                    "content": { "msgtype": "m.text", "body": "output" }
                                },
                                {
                                    "type": "m.room.message",
                                    "sender": "@alice:example.org",
                                    "content": { "msgtype": "m.image", "body": "cat.png" }
                                }
                            ]
                        }
                    }
                },
                "invite": {
                    "!new:example.org": {
                        "invite_state": {
                            "events": [
                                {
                                    "type": "m.room.name",
                                    "sender": "@alice:example.org",
                                    "state_key": "",
                                    "content": { "name": "ops" }
                                },
                                {
                                    "type": "m.room.member",
                                    "sender": "@alice:example.org",
                                    "state_key": BOT,
                                    "content": { "membership": "invite" }
                                }
                            ]
                        }
                    }
                },
                "leave": { "!old:example.org": {} }
            }
        }))
        .unwrap()
    }

    #[test]
    fn minimal_response_parses() {
        let resp: SyncResponse = serde_json::from_str(r#"{"next_batch":"s1"}"#).unwrap();
        assert_eq!(resp.next_batch, "s1");
        assert!(resp.rooms.join.is_empty());
        assert!(resp.events(&UserId::new(BOT)).is_empty());
    }

    #[test]
    fn timeline_messages_become_typed_events() {
        let events = fixture().events(&UserId::new(BOT));
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[0],
            ChatEvent::Message(MessageEvent::text(
                "!work:example.org",
                "@alice:example.org",
                "!shell ls"
            ))
        );
        match &events[1] {
            ChatEvent::Message(msg) => {
                assert_eq!(msg.text_body(), None);
                assert_eq!(
                    msg.content,
                    MessageContent::Other {
                        msgtype: "m.image".into()
                    }
                );
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn invite_names_the_member_event_sender() {
        let events = fixture().events(&UserId::new(BOT));
        assert_eq!(
            events[2],
            ChatEvent::Invite(InviteEvent {
                room: RoomId::new("!new:example.org"),
                invitee: UserId::new(BOT),
                inviter: Some(UserId::new("@alice:example.org")),
            })
        );
    }

    #[test]
    fn invite_for_someone_else_has_no_inviter() {
        let invites = fixture().invites(&UserId::new("@other:example.org"));
        assert_eq!(invites.len(), 1);
        match &invites[0] {
            ChatEvent::Invite(inv) => assert_eq!(inv.inviter, None),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn message_without_body_is_not_text() {
        let ev: RawEvent = serde_json::from_value(serde_json::json!({
            "type": "m.room.message",
            "sender": "@alice:example.org",
            "content": { "msgtype": "m.text" }
        }))
        .unwrap();
        let msg = ev.to_message("!r:x").unwrap();
        assert_eq!(msg.text_body(), None);
    }
}
