pub mod analyst;
pub mod matcher;
pub mod openai;
