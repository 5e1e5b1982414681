use crate::state::Peer;

#[derive(uniffi::Enum, Debug, Clone, PartialEq)]
pub enum ViewAction {
    // Peer selection
    SelectPeer { peer: Peer },
    ClearPeer,

    // Image preview
    OpenImagePreview { image_url: String },
    CloseImagePreview,

    // Lifecycle
    Unmount,
}

impl ViewAction {
    /// Log-safe action tag (never includes message content or image URLs).
    pub fn tag(&self) -> &'static str {
        match self {
            ViewAction::SelectPeer { .. } => "SelectPeer",
            ViewAction::ClearPeer => "ClearPeer",
            ViewAction::OpenImagePreview { .. } => "OpenImagePreview",
            ViewAction::CloseImagePreview => "CloseImagePreview",
            ViewAction::Unmount => "Unmount",
        }
    }
}
