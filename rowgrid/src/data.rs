use alloc::borrow::Cow;
use alloc::collections::BTreeMap;
use alloc::string::String;

#[cfg(feature = "std")]
use std::collections::HashMap;

/// Key-lookup contract for prepared row display data.
///
/// The paint pass pulls one value per column via the column key. A missing
/// field (`None`) paints as the empty string.
pub trait RowData {
    fn field(&self, key: &str) -> Option<Cow<'_, str>>;
}

impl RowData for BTreeMap<String, String> {
    fn field(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get(key).map(|value| Cow::Borrowed(value.as_str()))
    }
}

#[cfg(feature = "std")]
impl RowData for HashMap<String, String> {
    fn field(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get(key).map(|value| Cow::Borrowed(value.as_str()))
    }
}
