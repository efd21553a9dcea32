use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An activity the user explicitly asked for. Must-dos always make it into
/// the itinerary ahead of any scored candidate, regardless of category
/// preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MustDoActivity {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<f64>,
    #[serde(default = "Utc::now")]
    pub recorded_at: DateTime<Utc>,
}

impl MustDoActivity {
    /// Identity key: the case-insensitive trimmed name.
    fn normalized_name(&self) -> String {
        self.name.trim().to_lowercase()
    }
}

/// A deduplicated must-do set. Two entries collide when their normalized
/// names are equal or one contains the other ("louvre" vs "louvre museum"
/// is the same request twice); the earlier record wins.
#[derive(Debug, Clone, Default)]
pub struct MustDoList {
    items: Vec<MustDoActivity>,
}

impl MustDoList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the activity was rejected as a duplicate.
    pub fn insert(&mut self, activity: MustDoActivity) -> bool {
        let incoming = activity.normalized_name();
        if incoming.is_empty() {
            return false;
        }

        for existing in &self.items {
            let have = existing.normalized_name();
            if have == incoming || have.contains(&incoming) || incoming.contains(&have) {
                return false;
            }
        }

        self.items.push(activity);
        true
    }

    pub fn items(&self) -> &[MustDoActivity] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<MustDoActivity> for MustDoList {
    fn from_iter<I: IntoIterator<Item = MustDoActivity>>(iter: I) -> Self {
        let mut list = Self::new();
        for activity in iter {
            list.insert(activity);
        }
        list
    }
}
