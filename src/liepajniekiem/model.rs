use crate::liepajniekiem::api::ExtractError;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt::Display;

/// A single listing row of the calendar page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    /// Name of the movie, exhibition, venue or similar
    pub location: String,
    /// Free text shown next to the location, may contain markup
    pub description: String,
    /// Time as shown on the page (e.g. "19:00"), not parsed
    pub timestamp: String,
}

impl Event {
    pub fn new(location: String, description: String, timestamp: String) -> Self {
        Self {
            location,
            description,
            timestamp,
        }
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} @ {}", self.location, self.description, self.timestamp)
    }
}

/**
Events grouped by category, keeping categories in the order they first appear on the page.
*/
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventsByCategory {
    entries: Vec<(String, Vec<Event>)>,
}

impl EventsByCategory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an empty entry for the category unless it is already present
    pub fn start_category(&mut self, category: &str) {
        if self.position(category).is_none() {
            self.entries.push((category.to_string(), Vec::new()));
        }
    }

    pub fn push(&mut self, category: &str, event: Event) -> Result<(), ExtractError> {
        let index = self.position(category).ok_or(ExtractError::MalformedRow)?;

        self.entries[index].1.push(event);

        Ok(())
    }

    pub fn get(&self, category: &str) -> Option<&[Event]> {
        self.position(category)
            .map(|index| self.entries[index].1.as_slice())
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(category, _)| category.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Event])> {
        self.entries
            .iter()
            .map(|(category, events)| (category.as_str(), events.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn event_count(&self) -> usize {
        self.entries.iter().map(|(_, events)| events.len()).sum()
    }

    fn position(&self, category: &str) -> Option<usize> {
        self.entries.iter().position(|(name, _)| name == category)
    }
}

impl Serialize for EventsByCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;

        for (category, events) in &self.entries {
            map.serialize_entry(category, events)?;
        }

        map.end()
    }
}
