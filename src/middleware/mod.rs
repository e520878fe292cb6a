pub mod tenant;

pub use tenant::{tenant_filter, ResolvedTenant, TENANT_HEADER};
