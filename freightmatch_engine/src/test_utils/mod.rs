//! Helpers shared by the integration tests: a throwaway SQLite database per test, plus seed data in a South
//! African freight flavour.

mod prepare_env;
mod seeds;

pub use prepare_env::{create_database, prepare_test_env, random_db_path, run_migrations};
pub use seeds::{backdate_last_reset, cape_town, johannesburg, sample_bid, sample_load};
