//! Built-in policies and their collection filter translations
//!
//! Each policy is registered together with a translation that admits exactly
//! the rows the policy allows.

use crate::auth::filter::{CollectionFilterTranslator, Predicate};
use crate::auth::policy::{PolicyOutcome, PolicyRegistry};
use crate::core::models::{Authorizable, SubjectAttributes, fields};
use crate::utils::error::Result;

pub const OWNER_ONLY: &str = "ownerOnly";
pub const OWNER_OR_GROUP_ADMIN: &str = "ownerOrGroupAdmin";
pub const DEPARTMENT_EDITOR: &str = "departmentEditor";
pub const ADMIN_ONLY: &str = "adminOnly";
pub const AUTHENTICATED: &str = "authenticated";

/// Subject attribute listing the groups a subject administers
pub const ADMIN_GROUP_IDS: &str = "admin_group_ids";
/// Subject attribute and resource field naming a department
pub const DEPARTMENT: &str = "department";

pub const EDITOR_ROLE: &str = "editor";
pub const ADMIN_ROLE: &str = "admin";

/// The resource is owned by the subject
pub fn owner_only(subject: &SubjectAttributes, resource: &dyn Authorizable, _action: &str) -> PolicyOutcome {
    Ok(resource.owner_id() == Some(subject.id()))
}

/// The subject owns the resource or administers its group
pub fn owner_or_group_admin(
    subject: &SubjectAttributes,
    resource: &dyn Authorizable,
    _action: &str,
) -> PolicyOutcome {
    if resource.owner_id() == Some(subject.id()) {
        return Ok(true);
    }
    let admin_groups = subject.attribute_list(ADMIN_GROUP_IDS);
    Ok(resource
        .lookup(fields::GROUP_ID)
        .map(|group| admin_groups.contains(&group))
        .unwrap_or(false))
}

/// An editor may act on resources of their own department
pub fn department_editor(
    subject: &SubjectAttributes,
    resource: &dyn Authorizable,
    _action: &str,
) -> PolicyOutcome {
    if !subject.has_role(EDITOR_ROLE) {
        return Ok(false);
    }
    let Some(department) = subject.attribute(DEPARTMENT) else {
        return Ok(false);
    };
    Ok(resource.lookup(DEPARTMENT).as_ref() == Some(department))
}

pub fn admin_only(subject: &SubjectAttributes, _resource: &dyn Authorizable, _action: &str) -> PolicyOutcome {
    Ok(subject.has_role(ADMIN_ROLE))
}

/// Any authenticated subject
pub fn authenticated(subject: &SubjectAttributes, _resource: &dyn Authorizable, _action: &str) -> PolicyOutcome {
    Ok(!subject.id().is_empty())
}

/// Register the built-in policies
pub fn register_builtin_policies(registry: &mut PolicyRegistry) -> Result<()> {
    registry.register(OWNER_ONLY, owner_only)?;
    registry.register(OWNER_OR_GROUP_ADMIN, owner_or_group_admin)?;
    registry.register(DEPARTMENT_EDITOR, department_editor)?;
    registry.register(ADMIN_ONLY, admin_only)?;
    registry.register(AUTHENTICATED, authenticated)?;
    Ok(())
}

/// Register translations for the built-in policies
pub fn register_builtin_translations(translator: &mut CollectionFilterTranslator) -> Result<()> {
    translator.register(OWNER_ONLY, |subject, _action| {
        Predicate::equals(fields::OWNER_ID, subject.id())
    })?;

    translator.register(OWNER_OR_GROUP_ADMIN, |subject, _action| {
        Predicate::or(vec![
            Predicate::equals(fields::OWNER_ID, subject.id()),
            Predicate::one_of(
                fields::GROUP_ID,
                subject.attribute_list(ADMIN_GROUP_IDS).iter().cloned(),
            ),
        ])
    })?;

    translator.register(DEPARTMENT_EDITOR, |subject, _action| {
        match subject.attribute(DEPARTMENT) {
            Some(department) if subject.has_role(EDITOR_ROLE) => {
                Predicate::equals(DEPARTMENT, department.clone())
            }
            _ => Predicate::False,
        }
    })?;

    translator.register(ADMIN_ONLY, |subject, _action| {
        if subject.has_role(ADMIN_ROLE) {
            Predicate::True
        } else {
            Predicate::False
        }
    })?;

    translator.register(AUTHENTICATED, |subject, _action| {
        if subject.id().is_empty() {
            Predicate::False
        } else {
            Predicate::True
        }
    })?;

    Ok(())
}
