pub mod naming;
pub mod parse;
pub mod template;
