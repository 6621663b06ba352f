//! Seed data for local development

pub mod dev_seeder;

pub use dev_seeder::{DevDataSeeder, SeedSummary};
