mod directory;
mod model;
mod store;

pub use directory::{EntityDirectory, EntityRef, FileDirectory, NullDirectory};
pub use model::{GraphDocument, LinkRecord, NodeRecord, ZoneRecord};
pub use store::{DocumentStore, SaveHandle, SavePoll};
