pub mod answer;
pub mod participant;
pub mod question;
pub mod test;
pub mod test_result;
pub mod user_answer;
