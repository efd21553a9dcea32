pub mod assembly_service;
pub mod cost_service;
pub mod date_service;
pub mod direction_service;
pub mod planning_service;
pub mod scoring_service;
pub mod selection_service;
