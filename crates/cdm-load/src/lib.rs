#![deny(unsafe_code)]

pub mod context;
pub mod error;
pub mod forms;
pub mod pipeline;
pub mod relationships;
pub mod scope;
pub mod settings;
pub mod values;

pub use context::LoadContext;
pub use error::{LoadError, Result};
pub use forms::{FormRule, rule_for};
pub use pipeline::{
    FormSummary, GroupOutcome, LoadObserver, LoadSummary, Loader, NoopObserver, RecordFailure,
};
pub use relationships::{EpisodeLinks, link, link_episode_treatments};
pub use scope::{FactTally, SubjectScope};
pub use settings::{DefaultValues, LoadSettings, RegistrySettings, ResistanceSettings};
