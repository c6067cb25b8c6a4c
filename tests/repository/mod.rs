//! In-memory repository tests through the public façades

mod map_dao;
mod task_repository;
