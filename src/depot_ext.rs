//! Extension trait for Depot to easily access sessions

use salvo_core::Depot;

use crate::session::Session;

pub(crate) const SESSION_KEY: &str = "salvo.server.session";

/// Extension trait for Salvo's Depot to provide easy session access
pub trait SessionDepotExt {
    /// Get a reference to the session
    fn session(&self) -> Option<&Session>;

    /// Get a mutable reference to the session
    fn session_mut(&mut self) -> Option<&mut Session>;
}

impl SessionDepotExt for Depot {
    fn session(&self) -> Option<&Session> {
        self.get::<Session>(SESSION_KEY).ok()
    }

    fn session_mut(&mut self) -> Option<&mut Session> {
        self.get_mut::<Session>(SESSION_KEY).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_depot_access() {
        let mut depot = Depot::new();
        assert!(depot.session().is_none());

        depot.insert(SESSION_KEY, Session::new());
        depot.session_mut().unwrap().insert("foo", json!("foo"));

        let session = depot.session().unwrap();
        assert!(session.is_dirty());
        assert_eq!(session.get::<String>("foo"), Some("foo".to_string()));
    }
}
