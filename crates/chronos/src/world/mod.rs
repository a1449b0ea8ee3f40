mod inn;

pub use inn::{Inn, InnHandle, Npc};
