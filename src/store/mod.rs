mod csv;
mod history;

pub use history::HistoryStore;
