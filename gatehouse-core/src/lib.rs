//! Core functionality for the gatehouse multi-tenant authentication engine.
//!
//! Gatehouse serves many isolated tenants from one process: every tenant owns
//! its own user database and token-signing secret, and end users of a tenant
//! authenticate with a password followed by a short-lived one-time code.
//!
//! This crate holds the storage-agnostic pieces: the error taxonomy, tenant
//! and user models, the one-time-code engine, the token issuer/validator, the
//! repository traits storage backends implement, and the [`services::AuthService`]
//! orchestrator that drives the user-facing flows. Storage backends live in
//! sibling crates and plug in through [`repositories::CredentialRepository`]
//! and [`tenant::TenantDirectory`].

pub mod error;
pub mod id;
pub mod otp;
pub mod repositories;
pub mod services;
pub mod tenant;
pub mod token;
pub mod user;
pub mod validation;

pub use error::Error;
pub use tenant::{NewTenant, SigningSecret, Tenant, TenantDirectory, TenantId};
pub use token::TokenClaims;
pub use user::{User, UserId};
