//! Built-in identities for headless runs.
use game_core::{AgentProfile, ProfileMetadata};
use runtime::{ChatLine, StaticIdentityFeed};

const BOTS: [(&str, &str, i64, &str); 12] = [
    ("bot-aster", "Aster", 412, "#e84a5f"),
    ("bot-bramble", "Bramble", 87, "#2a9d8f"),
    ("bot-cinder", "Cinder", 1290, "#f4a261"),
    ("bot-dune", "Dune", 33, "#e9c46a"),
    ("bot-ember", "Ember", 560, "#d62828"),
    ("bot-fable", "Fable", 9, "#8338ec"),
    ("bot-gale", "Gale", 245, "#3a86ff"),
    ("bot-haze", "Haze", 731, "#adb5bd"),
    ("bot-iris", "Iris", 118, "#ff70a6"),
    ("bot-juniper", "Juniper", 64, "#38b000"),
    ("bot-kestrel", "Kestrel", 980, "#8d6e63"),
    ("bot-lumen", "Lumen", 301, "#ffd60a"),
];

const CHATTER: [(&str, &str); 8] = [
    ("Aster", "anyone else think the reactor sounds off today"),
    ("Cinder", "doing wires, do not bother me"),
    ("Haze", "I trust nobody on this ship"),
    ("Kestrel", "navigation is the best room, fight me"),
    ("Ember", "who keeps leaving the cafeteria lights on"),
    ("Gale", "medbay scan says I'm clean btw"),
    ("Lumen", "storage is creepy at night"),
    ("Bramble", "if I die avenge me"),
];

/// Candidates enough for several full rounds plus a rotating chat stream.
pub fn demo_feed(rounds: usize) -> StaticIdentityFeed {
    let candidates = (0..rounds).flat_map(|round| {
        BOTS.iter().map(move |&(id, name, karma, color)| {
            let posts = CHATTER
                .iter()
                .filter(|(sender, _)| *sender == name)
                .map(|(_, content)| *content);
            let metadata = ProfileMetadata {
                color: Some(color.to_owned()),
                karma,
                ..ProfileMetadata::default()
            }
            .with_posts(posts);
            AgentProfile::new(format!("{id}-{round}"), name).with_metadata(metadata)
        })
    });
    let chat = CHATTER
        .iter()
        .map(|&(sender, content)| ChatLine::new(sender, content));

    StaticIdentityFeed::new()
        .with_candidates(candidates)
        .with_chat(chat)
}
