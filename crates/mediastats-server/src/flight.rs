/// Single-flight registry: at most one in-flight computation per key, every
/// concurrent caller receiving that computation's result.
///
/// The leader publishes through a `watch` channel. `publish` unregisters the
/// key before sending, so a caller arriving after completion starts a fresh
/// computation instead of reading a stale handle; a caller holding the
/// receiver from before still sees the value. Handles never outlive their
/// computation.
use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::sync::watch;

/// Receiver half of one in-flight computation. `None` until published.
pub(crate) type FlightHandle<T> = watch::Receiver<Option<T>>;

/// What the registry hands a caller for a key.
pub(crate) enum Flight<T> {
    /// This caller runs the computation and must call [`FlightMap::publish`]
    /// exactly once.
    Lead(watch::Sender<Option<T>>),
    /// Another caller is already computing; await the handle.
    Join(FlightHandle<T>),
}

pub(crate) struct FlightMap<T> {
    flights: Mutex<HashMap<String, FlightHandle<T>>>,
}

impl<T: Clone> FlightMap<T> {
    pub fn new() -> Self {
        Self {
            flights: Mutex::new(HashMap::new()),
        }
    }

    /// Join the in-flight computation for `key`, or become its leader.
    pub fn join_or_lead(&self, key: &str) -> Flight<T> {
        let mut flights = self.flights.lock();
        if let Some(handle) = flights.get(key) {
            // A dead sender with nothing published means the previous
            // leader's task aborted before publishing; take over rather
            // than joining a flight that can no longer finish.
            let abandoned = handle.has_changed().is_err() && handle.borrow().is_none();
            if !abandoned {
                return Flight::Join(handle.clone());
            }
        }
        let (tx, rx) = watch::channel(None);
        flights.insert(key.to_owned(), rx);
        Flight::Lead(tx)
    }

    /// Publish the leader's result and drop the registration.
    ///
    /// Unregisters first: anyone holding the handle already still receives
    /// the value, anyone arriving later leads a new flight.
    pub fn publish(&self, key: &str, tx: &watch::Sender<Option<T>>, value: T) {
        self.flights.lock().remove(key);
        let _ = tx.send(Some(value));
    }

    pub fn contains(&self, key: &str) -> bool {
        self.flights.lock().contains_key(key)
    }

    /// Keys currently in flight, sorted for stable output.
    pub fn pending(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.flights.lock().keys().cloned().collect();
        keys.sort_unstable();
        keys
    }
}

/// Await a flight's published value.
///
/// `None` means the leader vanished without publishing; callers map that to
/// a computation failure.
pub(crate) async fn await_published<T: Clone>(mut handle: FlightHandle<T>) -> Option<T> {
    match handle.wait_for(|slot| slot.is_some()).await {
        Ok(slot) => slot.clone(),
        Err(_) => None,
    }
}
