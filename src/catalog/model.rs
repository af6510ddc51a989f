use serde::{Deserialize, Deserializer};

/// The fetched JSON document: a sequence of named groups of bookmark items.
///
/// The wire shape is trusted as-is (no schema validation beyond what serde
/// enforces). A group without `name` or `items` is malformed data and fails
/// the decode, which surfaces through the top-level failure path.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryDataset {
    /// Absent or `null` is treated as an empty sequence.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub groups: Vec<Group>,
}

/// A named category containing an ordered list of items.
#[derive(Debug, Clone, Deserialize)]
pub struct Group {
    /// Display label, doubles as the group sort key.
    pub name: String,
    pub items: Vec<Item>,
}

/// A single bookmark entry with a link target and optional display metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct Item {
    /// Absolute link target; also parsed for the hostname shown on the card.
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Item {
    /// Display title: `title` unless absent or empty, then the raw url.
    /// Also serves as the item sort key.
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title,
            _ => &self.url,
        }
    }

    /// Description text, empty when absent (never a "null" artifact).
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Group>, D::Error>
where
    D: Deserializer<'de>,
{
    let groups = Option::<Vec<Group>>::deserialize(deserializer)?;
    Ok(groups.unwrap_or_default())
}
