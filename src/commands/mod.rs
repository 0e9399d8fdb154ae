pub mod download;
pub mod rates;
pub mod split;
pub mod stats;
pub mod table;
