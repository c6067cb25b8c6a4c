//! PostgreSQL-backed tests
//!
//! `#[sqlx::test]` creates an isolated database per test from `DATABASE_URL`;
//! each test bootstraps the schema itself.
