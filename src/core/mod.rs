//! Core module - wizard state, navigation and step controllers

pub mod autofill;
pub mod config;
pub mod controller;
pub mod navigation;
pub mod notify;
pub mod review;
pub mod store;

pub use autofill::{
    AddressAutoFill, AutoFillOutcome, HttpPostalLookup, LookupDispatcher, LookupError,
    PostOffice, PostalLookup,
};
pub use config::Config;
pub use controller::{
    AcademicStepController, AddressStepController, FieldEdit, StepController, StepError,
};
pub use navigation::{guard, Resolution, Route, Step};
pub use notify::{ConsoleNotifier, Notifier, RecordingNotifier, Severity, Toast};
pub use review::{
    Receipt, ReviewController, SimulatedSubmitter, SubmitError, Submission, Submitter,
};
pub use store::{
    EnrollmentStore, FileStorage, MemoryStorage, PersistedState, StateStorage, StoreError,
};
