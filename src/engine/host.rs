use std::sync::{Arc, Mutex};

use crate::engine::context::{HostContext, Participant};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CharacterCard {
    pub name: String,
    pub avatar: String,
    /// Stat sheet written back by the stat engine
    pub stats: String,
}

#[derive(Default)]
struct Session {
    active: Option<usize>,
    cards: Vec<CharacterCard>,
}

/// Character session shared between the UI (writer) and the engine thread
/// (reader). The engine only learns about changes by asking, which is what
/// the poll tick is for.
#[derive(Clone, Default)]
pub struct SharedHost {
    session: Arc<Mutex<Session>>,
}

impl SharedHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the card with this name, creating it if needed. An empty
    /// name and avatar clears the selection.
    pub fn select(&self, name: &str, avatar: &str) {
        let Ok(mut session) = self.session.lock() else {
            return;
        };
        let (name, avatar) = (name.trim(), avatar.trim());
        if name.is_empty() && avatar.is_empty() {
            session.active = None;
            return;
        }

        let index = match session
            .cards
            .iter()
            .position(|c| c.name == name && c.avatar == avatar)
        {
            Some(index) => index,
            None => {
                session.cards.push(CharacterCard {
                    name: name.to_string(),
                    avatar: avatar.to_string(),
                    stats: String::new(),
                });
                session.cards.len() - 1
            }
        };
        session.active = Some(index);
    }

    pub fn active_card(&self) -> Option<CharacterCard> {
        let session = self.session.lock().ok()?;
        session.active.and_then(|i| session.cards.get(i).cloned())
    }

    pub fn cards(&self) -> Vec<CharacterCard> {
        self.session
            .lock()
            .map(|s| s.cards.clone())
            .unwrap_or_default()
    }
}

fn participant_of(session: &Session) -> Participant {
    let Some((index, card)) = session
        .active
        .and_then(|i| session.cards.get(i).map(|card| (i, card)))
    else {
        return Participant::Unresolved;
    };

    let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
    Participant::Active {
        name: non_empty(&card.name),
        avatar: non_empty(&card.avatar),
        id: index.to_string(),
    }
}

impl HostContext for SharedHost {
    fn active_participant(&self) -> Participant {
        match self.session.lock() {
            Ok(session) => participant_of(&session),
            Err(_) => Participant::Unresolved,
        }
    }

    fn store_card_stats(&self, scope: &str, text: &str) {
        let Ok(mut session) = self.session.lock() else {
            return;
        };
        if participant_of(&session).scope_key() != scope {
            return;
        }
        let active = session.active;
        let Some(card) = active.and_then(|i| session.cards.get_mut(i)) else {
            return;
        };
        card.stats = text.to_string();
        log::debug!("Saved stats to character card {}", scope);
    }
}
