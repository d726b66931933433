//! Borrower management
//!
//! - `GET /users` - List users ordered by id
//! - `GET /users/:id` - Get one user
//! - `POST /users` - Create a user
//! - `PUT /users/:id` - Partially update a user
//! - `DELETE /users/:id` - Delete a user without loans

pub mod routes;

pub use routes::users_routes;
