//! Feature modules. Each follows the same structure: `model.rs` for
//! entities and DTOs, `service.rs` for business logic, `controller.rs`
//! for HTTP handlers, `router.rs` for route wiring.

pub mod classrooms;
pub mod courses;
pub mod messages;
pub mod users;
