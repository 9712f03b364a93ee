//! Session value that tracks modifications

use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::SessionError;

/// Session payload as stored in the cache
pub type SessionData = Map<String, Value>;

/// Per-request session state.
///
/// Handlers read and write fields through the accessor methods; any write
/// marks the session dirty and the dirty flag never resets. Only dirty
/// sessions are persisted when the response is sent.
///
/// The id and the dirty flag live outside the data map, so iterating,
/// comparing or serializing a session only ever sees the handler's own keys.
#[derive(Clone, Debug, Default)]
pub struct Session {
    id: Option<String>,
    data: SessionData,
    dirty: bool,
}

impl Session {
    /// Create an empty, unmodified session
    pub fn new() -> Self {
        Self::default()
    }

    /// Hydrate a session from previously stored data.
    ///
    /// Hydration is not a modification: the session starts clean.
    pub fn from_data(data: SessionData) -> Self {
        Self {
            id: None,
            data,
            dirty: false,
        }
    }

    pub(crate) fn with_id(mut self, id: String) -> Self {
        self.id = Some(id);
        self
    }

    /// Id of the session, if the request carried a verified session cookie
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Whether any field was written since the session was created or restored
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Get a value from the session, deserialized into `T`
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Get the raw JSON value stored under `key`
    pub fn get_value(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Store a raw JSON value, returning the previous one
    pub fn insert<K: Into<String>>(&mut self, key: K, value: Value) -> Option<Value> {
        self.dirty = true;
        self.data.insert(key.into(), value)
    }

    /// Serialize `value` and store it under `key`
    pub fn set<K: Into<String>, T: Serialize>(
        &mut self,
        key: K,
        value: T,
    ) -> Result<(), SessionError> {
        let value = serde_json::to_value(value)?;
        self.insert(key, value);
        Ok(())
    }

    /// Remove a value from the session
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let result = self.data.remove(key);
        if result.is_some() {
            self.dirty = true;
        }
        result
    }

    /// Remove all values from the session
    pub fn clear(&mut self) {
        if !self.data.is_empty() {
            self.dirty = true;
        }
        self.data.clear();
    }

    /// Check if a key exists in the session
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.data.iter()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrow the session data
    pub fn data(&self) -> &SessionData {
        &self.data
    }

    /// Consume the session and return its data
    pub fn into_data(self) -> SessionData {
        self.data
    }
}

impl PartialEq for Session {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Serialize for Session {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.data.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: Value) -> SessionData {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected a JSON object"),
        }
    }

    #[test]
    fn test_new_session_is_clean() {
        let session = Session::new();
        assert!(!session.is_dirty());
        assert!(session.is_empty());
        assert_eq!(session.id(), None);
    }

    #[test]
    fn test_write_marks_dirty() {
        let mut session = Session::new();
        session.insert("foo", json!("foo"));
        assert_eq!(session.get::<String>("foo"), Some("foo".to_string()));
        assert!(session.is_dirty());

        session.insert("bar", json!(1));
        assert!(session.is_dirty());
    }

    #[test]
    fn test_hydrated_session_is_clean_until_written() {
        let mut session = Session::from_data(data(json!({ "foo": "foo" })));
        assert_eq!(session.get::<String>("foo"), Some("foo".to_string()));
        assert!(!session.is_dirty());

        session.set("bar", "bar").unwrap();
        assert!(session.is_dirty());
    }

    #[test]
    fn test_reassigning_same_value_marks_dirty() {
        let mut session = Session::from_data(data(json!({ "foo": "foo" })));
        session.insert("foo", json!("foo"));
        assert!(session.is_dirty());
    }

    #[test]
    fn test_reads_do_not_mark_dirty() {
        let session = Session::from_data(data(json!({ "foo": "foo", "n": 3 })));
        let _ = session.get::<i32>("n");
        let _ = session.get_value("missing");
        let _ = session.contains("foo");
        let _ = session.iter().count();
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_remove_marks_dirty_only_when_present() {
        let mut session = Session::from_data(data(json!({ "foo": "foo" })));
        assert_eq!(session.remove("missing"), None);
        assert!(!session.is_dirty());

        assert_eq!(session.remove("foo"), Some(json!("foo")));
        assert!(session.is_dirty());
        assert!(session.is_empty());
    }

    #[test]
    fn test_clear_marks_dirty() {
        let mut session = Session::from_data(data(json!({ "foo": "foo" })));
        session.clear();
        assert!(session.is_dirty());
        assert!(session.is_empty());
    }

    #[test]
    fn test_iteration_and_serialization_exclude_bookkeeping() {
        let mut session = Session::new().with_id("abc".to_string());
        session.insert("one", json!(true));

        let keys: Vec<&String> = session.keys().collect();
        assert_eq!(keys, vec!["one"]);
        assert_eq!(serde_json::to_value(&session).unwrap(), json!({ "one": true }));
    }

    #[test]
    fn test_equality_ignores_dirty_flag() {
        let clean = Session::from_data(data(json!({ "one": true })));
        let mut dirty = Session::new();
        dirty.insert("one", json!(true));
        assert_eq!(clean, dirty);
    }
}
