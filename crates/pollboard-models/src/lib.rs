pub mod choice;
pub mod question;

pub use choice::Choice;
pub use question::Question;

/// Maximum length for question and choice text, enforced at the form layer.
pub const TEXT_MAX_LEN: usize = 200;
