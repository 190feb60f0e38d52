use std::collections::BTreeMap;

use crate::form::{FieldRef, FormHost};

/// Dependency field name to its value at query time.
pub type QueryParameters = BTreeMap<String, String>;

/// Resolve every declared dependency near `origin` and record its current value.
///
/// Names that do not resolve to a field are skipped.
pub fn collect_parameters<H: FormHost + ?Sized>(
    host: &H,
    origin: &FieldRef,
    depends_on: &[String],
) -> QueryParameters {
    depends_on
        .iter()
        .filter_map(|name| {
            let field = host.find_near_by(origin, name)?;
            let value = host.value(&field)?;
            Some((name.clone(), value))
        })
        .collect()
}
