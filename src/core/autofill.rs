//! City/state auto-fill from a 6-digit PIN code
//!
//! Every PIN change bumps a generation counter. A lookup carries the
//! generation it was issued under, and its result is applied only if no newer
//! PIN change has happened since, so a slow answer for an old PIN can never
//! overwrite the address for the current one.

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::Deserialize;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::core::notify::Toast;
use crate::entities::catalog;
use crate::schema::rules;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Lookup service returned HTTP {0}")]
    Status(u16),

    #[error("No post office found for PIN {0}")]
    NoResults(String),

    #[error("Could not decode lookup response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl LookupError {
    /// Notice shown to the user for this failure
    pub fn toast(&self) -> Toast {
        match self {
            LookupError::Status(_) | LookupError::NoResults(_) => Toast::destructive(
                "Invalid PIN code",
                "Could not fetch location. Please enter manually.",
            ),
            LookupError::Network(_) | LookupError::Decode(_) => {
                Toast::destructive("Error", "Failed to fetch city/state. Try again.")
            }
        }
    }
}

/// The fields of a post office record the wizard uses
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PostOffice {
    #[serde(rename = "District")]
    pub district: String,

    #[serde(rename = "State")]
    pub state: String,
}

#[derive(Debug, Deserialize)]
struct LookupRecord {
    #[serde(rename = "Status", default)]
    status: String,

    #[serde(rename = "PostOffice", default)]
    post_office: Option<Vec<PostOffice>>,
}

/// Interpret a lookup response body; only the first record counts
pub fn parse_response(pin: &str, body: &str) -> Result<PostOffice, LookupError> {
    let records: Vec<LookupRecord> = serde_json::from_str(body)?;
    let record = records
        .into_iter()
        .next()
        .ok_or_else(|| LookupError::NoResults(pin.to_string()))?;
    if record.status != "Success" {
        return Err(LookupError::NoResults(pin.to_string()));
    }
    record
        .post_office
        .and_then(|offices| offices.into_iter().next())
        .ok_or_else(|| LookupError::NoResults(pin.to_string()))
}

/// Resolves a PIN code to its district and state
pub trait PostalLookup: Send + Sync {
    fn lookup(&self, pin: &str) -> Result<PostOffice, LookupError>;
}

/// Lookup against a `GET {base}/pincode/{pin}` service
pub struct HttpPostalLookup {
    client: Client,
    base_url: String,
}

impl HttpPostalLookup {
    pub fn new(base_url: impl Into<String>) -> Result<Self, LookupError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, pin: &str) -> String {
        format!("{}/pincode/{}", self.base_url, pin)
    }
}

impl PostalLookup for HttpPostalLookup {
    fn lookup(&self, pin: &str) -> Result<PostOffice, LookupError> {
        tracing::debug!("Looking up PIN {}", pin);
        let response = self
            .client
            .get(self.url(pin))
            .header(USER_AGENT, format!("enroll/{}", env!("CARGO_PKG_VERSION")))
            .header(ACCEPT, "application/json")
            .send()?;

        if !response.status().is_success() {
            return Err(LookupError::Status(response.status().as_u16()));
        }

        let body = response.text()?;
        parse_response(pin, &body)
    }
}

/// A lookup request tagged with the PIN generation it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    pub generation: u64,
    pub pin: String,
}

/// A finished lookup
#[derive(Debug)]
pub struct LookupReply {
    pub ticket: LookupTicket,
    pub result: Result<PostOffice, LookupError>,
}

/// What applying a lookup reply did
#[derive(Debug)]
pub enum AutoFillOutcome {
    /// City and state should be overwritten and the state field locked
    Filled { city: String, state: String },
    /// The lookup failed; existing values stay and the state field unlocks
    Failed(LookupError),
    /// A newer PIN change superseded this lookup
    Stale,
}

impl AutoFillOutcome {
    pub fn toast(&self) -> Option<Toast> {
        match self {
            AutoFillOutcome::Filled { city, state } => Some(Toast::success(
                "Address auto-filled",
                format!("Detected {}, {}", city, state),
            )),
            AutoFillOutcome::Failed(e) => Some(e.toast()),
            AutoFillOutcome::Stale => None,
        }
    }
}

/// Lookup sequencing and the state-field lock
#[derive(Debug, Default)]
pub struct AddressAutoFill {
    generation: u64,
    last_pin: Option<String>,
    locked: bool,
}

impl AddressAutoFill {
    pub fn new() -> Self {
        Self::default()
    }

    /// React to the PIN field changing.
    ///
    /// Returns a ticket when the new PIN is complete and a lookup should be
    /// issued. Any PIN change supersedes lookups already in flight; a PIN
    /// shorter than 6 digits also unlocks the state field at once.
    pub fn on_pin_change(&mut self, pin: Option<&str>) -> Option<LookupTicket> {
        let pin = pin.map(str::trim).unwrap_or_default();
        if self.last_pin.as_deref() == Some(pin) {
            return None;
        }
        self.last_pin = Some(pin.to_string());
        self.generation += 1;

        if rules::is_complete_pin(pin) {
            Some(LookupTicket {
                generation: self.generation,
                pin: pin.to_string(),
            })
        } else {
            self.locked = false;
            None
        }
    }

    /// Apply a finished lookup if it is still current
    pub fn apply(&mut self, reply: LookupReply) -> AutoFillOutcome {
        if reply.ticket.generation != self.generation {
            tracing::debug!(
                "Discarding stale lookup for PIN {} (generation {} < {})",
                reply.ticket.pin,
                reply.ticket.generation,
                self.generation
            );
            return AutoFillOutcome::Stale;
        }

        match reply.result {
            Ok(office) => {
                self.locked = true;
                let state = catalog::canonical_state(&office.state)
                    .map(String::from)
                    .unwrap_or(office.state);
                AutoFillOutcome::Filled {
                    city: office.district,
                    state,
                }
            }
            Err(e) => {
                tracing::info!("PIN lookup for {} failed: {}", reply.ticket.pin, e);
                self.locked = false;
                AutoFillOutcome::Failed(e)
            }
        }
    }

    /// Whether the state field currently holds an auto-filled value
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Runs lookups on worker threads and hands replies back over a channel
pub struct LookupDispatcher {
    lookup: Arc<dyn PostalLookup>,
    tx: Sender<LookupReply>,
    rx: Receiver<LookupReply>,
    in_flight: usize,
}

impl LookupDispatcher {
    pub fn new(lookup: Arc<dyn PostalLookup>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            lookup,
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn dispatch(&mut self, ticket: LookupTicket) {
        let lookup = Arc::clone(&self.lookup);
        let tx = self.tx.clone();
        self.in_flight += 1;
        std::thread::spawn(move || {
            let result = lookup.lookup(&ticket.pin);
            // Receiver gone means the step was closed; nothing to report
            let _ = tx.send(LookupReply { ticket, result });
        });
    }

    /// Replies that have already arrived
    pub fn try_recv_all(&mut self) -> Vec<LookupReply> {
        let replies: Vec<LookupReply> = self.rx.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(replies.len());
        replies
    }

    /// Block for the next reply, up to `timeout`
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<LookupReply> {
        if self.in_flight == 0 {
            return None;
        }
        match self.rx.recv_timeout(timeout) {
            Ok(reply) => {
                self.in_flight -= 1;
                Some(reply)
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Block until every dispatched lookup has answered or `timeout` passes
    pub fn drain(&mut self, timeout: Duration) -> Vec<LookupReply> {
        let deadline = Instant::now() + timeout;
        let mut replies = Vec::new();
        while self.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match self.recv_timeout(remaining) {
                Some(reply) => replies.push(reply),
                None => break,
            }
        }
        replies
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn office(district: &str, state: &str) -> PostOffice {
        PostOffice {
            district: district.to_string(),
            state: state.to_string(),
        }
    }

    fn reply(ticket: &LookupTicket, result: Result<PostOffice, LookupError>) -> LookupReply {
        LookupReply {
            ticket: ticket.clone(),
            result,
        }
    }

    /// Answers from a fixed table, holding back chosen PINs until released
    struct FakeLookup {
        offices: HashMap<&'static str, PostOffice>,
        gate: Mutex<Option<Receiver<()>>>,
        slow_pin: &'static str,
    }

    impl PostalLookup for FakeLookup {
        fn lookup(&self, pin: &str) -> Result<PostOffice, LookupError> {
            if pin == self.slow_pin {
                if let Some(gate) = self.gate.lock().unwrap().take() {
                    let _ = gate.recv();
                }
            }
            self.offices
                .get(pin)
                .cloned()
                .ok_or_else(|| LookupError::NoResults(pin.to_string()))
        }
    }

    #[test]
    fn test_parse_response() {
        let body = r#"[{"Status":"Success","PostOffice":[
            {"Name":"Connaught Place","District":"New Delhi","State":"Delhi"},
            {"Name":"Janpath","District":"Central Delhi","State":"Delhi"}]}]"#;
        assert_eq!(
            parse_response("110001", body).unwrap(),
            office("New Delhi", "Delhi")
        );

        let none = r#"[{"Message":"No records found","Status":"Error","PostOffice":null}]"#;
        assert!(matches!(
            parse_response("999999", none),
            Err(LookupError::NoResults(_))
        ));
        assert!(matches!(
            parse_response("999999", "<html>"),
            Err(LookupError::Decode(_))
        ));
        assert!(matches!(
            parse_response("999999", "[]"),
            Err(LookupError::NoResults(_))
        ));
    }

    #[test]
    fn test_only_latest_lookup_applies() {
        let mut autofill = AddressAutoFill::new();
        let delhi = autofill.on_pin_change(Some("110001")).unwrap();
        let mumbai = autofill.on_pin_change(Some("400001")).unwrap();

        // Mumbai answers first, then the slow Delhi reply arrives
        let outcome = autofill.apply(reply(&mumbai, Ok(office("Mumbai", "Maharashtra"))));
        assert!(matches!(outcome, AutoFillOutcome::Filled { ref city, .. } if city == "Mumbai"));
        let outcome = autofill.apply(reply(&delhi, Ok(office("New Delhi", "Delhi"))));
        assert!(matches!(outcome, AutoFillOutcome::Stale));
        assert!(autofill.is_locked());
    }

    #[test]
    fn test_short_pin_unlocks_and_supersedes() {
        let mut autofill = AddressAutoFill::new();
        let ticket = autofill.on_pin_change(Some("110001")).unwrap();
        autofill.apply(reply(&ticket, Ok(office("New Delhi", "Delhi"))));
        assert!(autofill.is_locked());

        let again = autofill.on_pin_change(Some("400001")).unwrap();
        assert!(autofill.on_pin_change(Some("4000")).is_none());
        assert!(!autofill.is_locked());
        assert!(matches!(
            autofill.apply(reply(&again, Ok(office("Mumbai", "Maharashtra")))),
            AutoFillOutcome::Stale
        ));
    }

    #[test]
    fn test_failure_unlocks_with_notice() {
        let mut autofill = AddressAutoFill::new();
        let ticket = autofill.on_pin_change(Some("999999")).unwrap();
        let outcome = autofill.apply(reply(&ticket, Err(LookupError::NoResults("999999".into()))));
        assert!(!autofill.is_locked());
        assert_eq!(outcome.toast().unwrap().title, "Invalid PIN code");

        let outcome = AutoFillOutcome::Failed(LookupError::Status(503));
        assert_eq!(outcome.toast().unwrap().title, "Invalid PIN code");
    }

    #[test]
    fn test_unchanged_pin_does_not_relookup() {
        let mut autofill = AddressAutoFill::new();
        assert!(autofill.on_pin_change(Some("110001")).is_some());
        assert!(autofill.on_pin_change(Some("110001")).is_none());
        assert_eq!(autofill.generation(), 1);
    }

    #[test]
    fn test_state_name_canonicalized() {
        let mut autofill = AddressAutoFill::new();
        let ticket = autofill.on_pin_change(Some("400001")).unwrap();
        let outcome = autofill.apply(reply(&ticket, Ok(office("Mumbai", "MAHARASHTRA"))));
        assert!(matches!(outcome, AutoFillOutcome::Filled { ref state, .. } if state == "Maharashtra"));
    }

    #[test]
    fn test_dispatcher_discards_slow_stale_reply() {
        let (release, gate) = mpsc::channel();
        let lookup = Arc::new(FakeLookup {
            offices: [
                ("110001", office("New Delhi", "Delhi")),
                ("400001", office("Mumbai", "Maharashtra")),
            ]
            .into_iter()
            .collect(),
            gate: Mutex::new(Some(gate)),
            slow_pin: "110001",
        });

        let mut autofill = AddressAutoFill::new();
        let mut dispatcher = LookupDispatcher::new(lookup);
        dispatcher.dispatch(autofill.on_pin_change(Some("110001")).unwrap());
        dispatcher.dispatch(autofill.on_pin_change(Some("400001")).unwrap());

        let first = dispatcher.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(first.ticket.pin, "400001");
        assert!(matches!(autofill.apply(first), AutoFillOutcome::Filled { .. }));

        release.send(()).unwrap();
        let second = dispatcher.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(autofill.apply(second), AutoFillOutcome::Stale));
        assert_eq!(dispatcher.in_flight(), 0);
    }
}
