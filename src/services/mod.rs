pub mod participant_service;
pub mod result_service;
pub mod scoring;
pub mod session_service;
pub mod test_service;
