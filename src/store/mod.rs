mod history;

pub use history::HistoryStore;
