//! Status row markers.

/// Glyph that marks a broadcaster as live.
pub const ONLINE_GLYPH: &str = "🟢";
/// Placeholder glyph for an offline broadcaster.
pub const OFFLINE_GLYPH: &str = "&nbsp;";

/// One of the two row variants a document can hold for an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMarker {
    /// `🟢 | \`name\``
    Online,
    /// `&nbsp; | \`name\``
    Offline,
}

impl StatusMarker {
    /// Returns the marker for the given state.
    pub fn for_state(online: bool) -> Self {
        if online {
            Self::Online
        } else {
            Self::Offline
        }
    }

    /// Returns the opposite marker.
    pub fn opposite(self) -> Self {
        match self {
            Self::Online => Self::Offline,
            Self::Offline => Self::Online,
        }
    }

    /// Returns the glyph for this marker.
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Online => ONLINE_GLYPH,
            Self::Offline => OFFLINE_GLYPH,
        }
    }

    /// Renders the row text for `name`.
    pub fn row(self, name: &str) -> String {
        format!("{} | `{}`", self.glyph(), name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_format() {
        assert_eq!(StatusMarker::Online.row("acme"), "🟢 | `acme`");
        assert_eq!(StatusMarker::Offline.row("acme"), "&nbsp; | `acme`");
    }

    #[test]
    fn opposite_and_state() {
        assert_eq!(StatusMarker::for_state(true), StatusMarker::Online);
        assert_eq!(StatusMarker::for_state(false), StatusMarker::Offline);
        assert_eq!(StatusMarker::Online.opposite(), StatusMarker::Offline);
        assert_eq!(StatusMarker::Offline.opposite(), StatusMarker::Online);
    }
}
