mod journal;
mod manifest_store;
mod resolver;

pub use journal::IRunJournal;
pub use manifest_store::{IManifestStore, SupersedeTarget};
pub use resolver::IPointerResolver;
