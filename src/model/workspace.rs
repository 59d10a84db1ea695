use super::ItemId;
use serde::{Deserialize, Serialize};

/// A workspace ("space"): a named container of items.
///
/// The theme is owned by the host's theming code and carried opaquely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub uuid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<u32>,
    #[serde(default)]
    pub position: u32,
}

impl Workspace {
    pub fn new(uuid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            name: name.into(),
            icon: None,
            theme: None,
            container_id: None,
            position: 0,
        }
    }
}

/// How the panes of a split view are arranged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SplitLayout {
    /// Panes side by side
    #[default]
    Vertical,
    /// Panes stacked top to bottom
    Horizontal,
    Grid,
}

/// A split view: several items shown together, keyed by its group id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitView {
    pub group_id: ItemId,
    pub item_ids: Vec<ItemId>,
    #[serde(default)]
    pub layout: SplitLayout,
}
