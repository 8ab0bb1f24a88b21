mod book;

pub use book::OrderBook;
