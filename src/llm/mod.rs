pub mod extract;
pub mod openai;
