/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Sign-up and sign-in
/// - `items`: Ownership-scoped task endpoints

pub mod auth;
pub mod health;
pub mod items;
