//! Character roster for a story.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-assigned identifier for a character.
///
/// Opaque to the engine. The backend may echo it as a string or a number,
/// so both are accepted on the way in; it always serializes as a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawCharacterId")]
pub struct CharacterId(String);

impl CharacterId {
    /// Wrap a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCharacterId {
    Text(String),
    Number(i64),
}

impl From<RawCharacterId> for CharacterId {
    fn from(raw: RawCharacterId) -> Self {
        match raw {
            RawCharacterId::Text(s) => Self(s),
            RawCharacterId::Number(n) => Self(n.to_string()),
        }
    }
}

/// A named entity that scenes can reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    /// Unset until the character store assigns one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CharacterId>,
    /// Display name; the key scenes use to reference this character.
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_name: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity: Option<i64>,
}

impl Character {
    /// Create an unsaved character with just a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: String::new(),
            role: String::new(),
            actor_name: None,
            image_urls: Vec::new(),
            popularity: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the role.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    /// Set the actor playing this character.
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor_name = Some(actor.into());
        self
    }

    /// Set the popularity score.
    pub fn with_popularity(mut self, popularity: i64) -> Self {
        self.popularity = Some(popularity);
        self
    }

    /// Set the persisted identity.
    pub fn with_id(mut self, id: CharacterId) -> Self {
        self.id = Some(id);
        self
    }
}

/// The ordered set of characters owned by one story.
///
/// Names are not required to be unique. Lookups by name resolve to the
/// first character whose name is equal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    characters: Vec<Character>,
}

impl Roster {
    /// Create an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a roster from characters in display order.
    pub fn from_characters(characters: Vec<Character>) -> Self {
        Self { characters }
    }

    /// All characters in display order.
    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn iter(&self) -> impl Iterator<Item = &Character> {
        self.characters.iter()
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Every character name in roster order.
    ///
    /// This is the "known names" list handed to the renderer and to
    /// [`crate::color::color_for`].
    pub fn names(&self) -> Vec<String> {
        self.characters.iter().map(|c| c.name.clone()).collect()
    }

    /// Find the first character with exactly this name.
    pub fn find(&self, name: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.name == name)
    }

    /// Check whether any character has exactly this name.
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.characters.iter().position(|c| c.name == name)
    }

    pub(crate) fn find_mut(&mut self, name: &str) -> Option<&mut Character> {
        self.characters.iter_mut().find(|c| c.name == name)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Character> {
        self.characters.get_mut(index)
    }

    pub(crate) fn push(&mut self, character: Character) {
        self.characters.push(character);
    }

    /// Remove the first character with this name.
    pub(crate) fn remove(&mut self, name: &str) -> Option<Character> {
        let index = self.position(name)?;
        Some(self.characters.remove(index))
    }

    /// Rename the first character called `old`. Returns false if none matched.
    pub(crate) fn rename(&mut self, old: &str, new: &str) -> bool {
        match self.find_mut(old) {
            Some(character) => {
                character.name = new.to_string();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_wins() {
        let roster = Roster::from_characters(vec![
            Character::new("Ann").with_role("lead"),
            Character::new("Ann").with_role("double"),
        ]);

        assert_eq!(roster.find("Ann").map(|c| c.role.as_str()), Some("lead"));
        assert_eq!(roster.position("Ann"), Some(0));
    }

    #[test]
    fn test_lookup_is_exact() {
        let roster = Roster::from_characters(vec![Character::new("Ann")]);
        assert!(roster.contains("Ann"));
        assert!(!roster.contains("ann"));
        assert!(!roster.contains("Anna"));
    }

    #[test]
    fn test_rename_and_remove_touch_only_first() {
        let mut roster =
            Roster::from_characters(vec![Character::new("Ann"), Character::new("Ann")]);

        assert!(roster.rename("Ann", "Annabelle"));
        assert_eq!(roster.names(), vec!["Annabelle", "Ann"]);

        assert!(roster.remove("Ann").is_some());
        assert_eq!(roster.names(), vec!["Annabelle"]);
        assert!(roster.remove("Ann").is_none());
        assert!(!roster.rename("Ann", "X"));
    }

    #[test]
    fn test_character_id_accepts_numbers() {
        let c: Character = serde_json::from_str(r#"{"id": 42, "name": "Bob"}"#).unwrap();
        assert_eq!(c.id, Some(CharacterId::new("42")));
        assert_eq!(c.description, "");
        assert!(c.image_urls.is_empty());

        let c: Character = serde_json::from_str(r#"{"id": "abc", "name": "Bob"}"#).unwrap();
        assert_eq!(c.id.as_ref().map(CharacterId::as_str), Some("abc"));
    }

    #[test]
    fn test_character_serializes_camel_case() {
        let c = Character::new("Bob").with_actor("Robert");
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["actorName"], "Robert");
        assert!(json.get("id").is_none());
    }
}
