/// Attribute declaration entity module
pub mod attribute;
/// Subject attribute value entity module
pub mod attribute_value;
/// Role declaration entity module
pub mod role;
/// Role assignment entity module
pub mod role_assignment;
/// Service entity module
pub mod service;

pub use attribute::Entity as Attribute;
pub use attribute_value::Entity as AttributeValue;
pub use role::Entity as Role;
pub use role_assignment::Entity as RoleAssignment;
pub use service::Entity as Service;
