//! Types shared verbatim between the database and the API.

mod answer;
mod question;

pub use answer::{Answer, AnswerValue};
pub use question::{Question, QuestionId, QuestionType};
