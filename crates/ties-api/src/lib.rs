//! JSON REST API for the Ties partner-relation subsystem.
//!
//! Exposes an axum [`Router`] backed by any
//! [`ties_core::store::RelationStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility — this is the integration boundary
//! toward the host contact application.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", ties_api::api_router(store.clone()))
//! ```

pub mod assist;
pub mod error;
pub mod participants;
pub mod partners;
pub mod relations;
pub mod types;
pub mod view;

use std::sync::Arc;

use axum::{Router, routing::get};
use ties_core::store::RelationStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: RelationStore + Clone + Send + Sync + 'static,
{
  Router::new()
    // Partner mirror
    .route(
      "/partners",
      get(partners::list::<S>).put(partners::upsert::<S>),
    )
    .route("/partners/{id}", get(partners::get_one::<S>))
    // Relation types and the derived selection catalog
    .route("/types", get(types::list::<S>).post(types::create::<S>))
    .route(
      "/types/{id}",
      get(types::get_one::<S>).put(types::update::<S>),
    )
    .route("/selections", get(types::selections::<S>))
    // Stored relations
    .route(
      "/relations",
      get(relations::list::<S>).post(relations::create::<S>),
    )
    .route(
      "/relations/{id}",
      get(relations::get_one::<S>)
        .put(relations::update::<S>)
        .delete(relations::delete_one::<S>),
    )
    // Bidirectional view
    .route("/view", get(view::list::<S>).post(view::create::<S>))
    .route(
      "/view/{id}",
      get(view::get_one::<S>)
        .put(view::update::<S>)
        .delete(view::delete_one::<S>),
    )
    // Participants and form-assist callbacks
    .route("/participants", get(participants::handler::<S>))
    .route("/assist/other-partner", get(assist::other_partner::<S>))
    .route("/assist/selections", get(assist::selections::<S>))
    .with_state(store)
}
