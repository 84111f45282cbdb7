//! The "has a name" capability shared by every case element.

/// Label given to a case or element constructed without an explicit name.
pub const DEFAULT_NAME: &str = "named";

/// Read access to the display label of a case element.
///
/// Names are kept verbatim: no trimming, no uniqueness check. Two buses may
/// legally carry the same name; identity is carried by the element id.
pub trait Named {
    fn name(&self) -> &str;

    /// True when the element still carries [`DEFAULT_NAME`].
    fn has_default_name(&self) -> bool {
        self.name() == DEFAULT_NAME
    }
}

pub(crate) fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

macro_rules! impl_named {
    ($($type:ty),+ $(,)?) => {
        $(
            impl $crate::named::Named for $type {
                #[inline]
                fn name(&self) -> &str {
                    &self.name
                }
            }
        )+
    };
}

pub(crate) use impl_named;
