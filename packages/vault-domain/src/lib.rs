pub mod continuation;
pub mod date;
pub mod intent;
pub mod similarity;
