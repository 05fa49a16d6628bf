// handlers/mod.rs - two handler tiers
//
// Public (no auth): service info, health, login
// Protected (JWT auth): posts, comments, albums, photos
pub mod protected;
pub mod public;
