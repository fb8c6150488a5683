//! Roster persistence.
//!
//! Each collection lives in its own slot as a JSON array, in roster order.
//! Saving overwrites the slot wholesale. A missing slot loads as an empty
//! collection.

use tracing::debug;

use crate::error::Result;
use crate::model::{Participant, Team};
use crate::roster::Roster;
use crate::storage::KeyValueStore;

/// Slot holding the participant collection.
pub const PARTICIPANTS_KEY: &str = "participants";

/// Slot holding the team collection.
pub const TEAMS_KEY: &str = "teams";

/// Read both collections from the store.
///
/// # Errors
///
/// Returns an error if a slot cannot be read or holds malformed JSON.
pub fn load_roster(store: &impl KeyValueStore) -> Result<Roster> {
    let participants: Vec<Participant> = read_slot(store, PARTICIPANTS_KEY)?;
    let teams: Vec<Team> = read_slot(store, TEAMS_KEY)?;
    debug!(
        "Loaded {} participants and {} teams",
        participants.len(),
        teams.len()
    );
    Ok(Roster::from_parts(participants, teams))
}

/// Overwrite the participant slot.
///
/// # Errors
///
/// Returns an error if serialization or the store write fails.
pub fn save_participants(store: &mut impl KeyValueStore, roster: &Roster) -> Result<()> {
    store.set(PARTICIPANTS_KEY, &encode_participants(roster)?)
}

/// Overwrite the team slot.
///
/// # Errors
///
/// Returns an error if serialization or the store write fails.
pub fn save_teams(store: &mut impl KeyValueStore, roster: &Roster) -> Result<()> {
    store.set(TEAMS_KEY, &encode_teams(roster)?)
}

/// Overwrite both slots, participants first.
///
/// # Errors
///
/// Returns an error if serialization or a store write fails.
pub fn save_roster(store: &mut impl KeyValueStore, roster: &Roster) -> Result<()> {
    save_participants(store, roster)?;
    save_teams(store, roster)
}

/// Serialize the participant collection.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode_participants(roster: &Roster) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(roster.participants())?)
}

/// Serialize the team collection.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode_teams(roster: &Roster) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(roster.teams())?)
}

fn read_slot<T: serde::de::DeserializeOwned>(
    store: &impl KeyValueStore,
    key: &str,
) -> Result<Vec<T>> {
    match store.get(key)? {
        Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
        None => Ok(Vec::new()),
    }
}
