use crate::model::{ItemAttrs, ItemId};

/// Top-level sidebar section an item is shown in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Section {
    /// Promoted items, shared by every workspace of a container identity
    Essential { container_id: u32 },
    Pinned { workspace_id: Option<String> },
    Normal { workspace_id: Option<String> },
}

impl Section {
    /// Sections are laid out essentials, then pinned, then normal.
    pub fn rank(&self) -> u8 {
        match self {
            Section::Essential { .. } => 0,
            Section::Pinned { .. } => 1,
            Section::Normal { .. } => 2,
        }
    }
}

/// The structural container an item belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerKey {
    pub section: Section,
    pub parent_group_id: Option<ItemId>,
}

impl ContainerKey {
    /// Classify by promoted, then pinned, then normal.
    pub fn of(attrs: &ItemAttrs) -> Self {
        let section = if attrs.essential {
            Section::Essential {
                container_id: attrs.container_id,
            }
        } else if attrs.pinned {
            Section::Pinned {
                workspace_id: attrs.workspace_id.clone(),
            }
        } else {
            Section::Normal {
                workspace_id: attrs.workspace_id.clone(),
            }
        };
        Self {
            section,
            parent_group_id: attrs.parent_group_id.clone(),
        }
    }
}
