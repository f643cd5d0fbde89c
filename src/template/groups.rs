//! Group chain resolution for command templates

use tracing::trace;

use crate::error::{EntryKind, ResolveError};

use super::registry::{GroupTemplate, RequestTemplate, TemplateRegistry, DEFAULT_GROUP};

/// Ordered group names that apply to a template
///
/// Declared groups come first in declaration order, then `DEFAULT`. Repeats
/// keep their first position, so `DEFAULT` appears exactly once.
pub fn resolve_group_names(template: &RequestTemplate) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::with_capacity(template.groups().len() + 1);
    let declared = template.groups().iter().map(|s| s.as_str());
    for name in declared.chain(std::iter::once(DEFAULT_GROUP)) {
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// Group templates that apply to a template, in precedence order
///
/// Fails on the first declared group that is not registered. An unregistered
/// `DEFAULT` is skipped.
pub fn resolve_group_templates<'r>(
    registry: &'r TemplateRegistry,
    template: &RequestTemplate,
) -> Result<Vec<(&'r str, &'r GroupTemplate)>, ResolveError> {
    let mut resolved = Vec::new();
    for name in resolve_group_names(template) {
        match registry.group_entry(name) {
            Some(entry) => resolved.push(entry),
            None if name == DEFAULT_GROUP => {
                trace!("no DEFAULT group registered, skipping");
            }
            None => return Err(ResolveError::not_found(EntryKind::Group, name)),
        }
    }
    Ok(resolved)
}
