pub mod parser_state;
pub mod patterns;
