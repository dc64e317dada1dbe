mod model;

pub use model::{Entry, EntryInput, EntryTable, Posts, Tickets};
