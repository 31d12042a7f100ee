//! Graph layout conventions.
//!
//! Entity types are nodes too. Every entity instance hangs off its type node
//! through an instance-of edge, and the type node records which domain it
//! belongs to:
//!
//! ```text
//! (type:ModelType {app_label, model_name, name}) -[:<<INSTANCE>>]-> (entity {name, ...})
//! (entity) -[:owner]-> (other entity)
//! ```
//!
//! Domain scoping is therefore always "instances of a type node whose
//! `app_label` is the domain's".

/// Relationship type of the instance-of edge (type node → instance).
pub const INSTANCE_OF: &str = "<<INSTANCE>>";

/// Display label of the instance-of edge in propositions.
pub const INSTANCE_OF_LABEL: &str = "is instance of";

/// Node label carried by every type node.
pub const TYPE_LABEL: &str = "ModelType";

/// Property on type nodes holding the domain partition.
pub const APP_LABEL: &str = "app_label";

/// Property on type nodes holding the type's class name.
pub const MODEL_NAME: &str = "model_name";

/// Literal name property (type nodes and instances).
pub const NAME: &str = "name";

/// Property on instances listing the ids of users that edited them.
pub const AUTHOR: &str = "_author";

/// Property identifying country instances.
pub const ISOA3: &str = "isoa3";

/// Type name of country entities.
pub const COUNTRY_MODEL: &str = "Country";
