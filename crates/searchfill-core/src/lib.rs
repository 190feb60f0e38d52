//! Searchfill Core: server-backed suggestions for form fields.
//!
//! A searchable field queries a remote endpoint as the user types, sending
//! the values of the sibling fields it depends on, and can keep the label
//! shown to the user apart from the value it submits.

pub mod config;
pub mod debounce;
pub mod dependency;
pub mod driver;
pub mod error;
pub mod field;
pub mod form;
pub mod response;
pub mod source;
pub mod store;
pub mod view;

pub use config::{FailurePolicy, FieldConfig, FormConfig, RequestMethod, ResolutionMode};
pub use debounce::Debouncer;
pub use dependency::{QueryParameters, collect_parameters};
pub use driver::FieldDriver;
pub use error::{FillError, Result};
pub use field::{Directive, FetchRequest, FieldEvent, FieldState, SearchableField};
pub use form::{FieldRef, FormHost, MemoryField, MemoryForm};
pub use response::decode_suggestions;
pub use source::SuggestionSource;
pub use store::{Suggestion, SuggestionStore};
pub use view::{RecordingView, SuggestionView};
