pub mod feed;
pub mod run;
