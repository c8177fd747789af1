//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. `AllocationRepo` methods
//! that must also run inside a transaction accept any `PgExecutor` instead.

pub mod allocation_repo;
pub mod material_repo;
pub mod project_repo;
pub mod task_repo;
pub mod user_repo;
pub mod workpackage_repo;

pub use allocation_repo::AllocationRepo;
pub use material_repo::MaterialRepo;
pub use project_repo::ProjectRepo;
pub use task_repo::TaskRepo;
pub use user_repo::UserRepo;
pub use workpackage_repo::WorkpackageRepo;
