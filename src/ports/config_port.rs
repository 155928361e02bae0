//! Configuration access port trait.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// `None` when the key is absent or its value is not a recognised boolean.
    fn try_get_bool(&self, section: &str, key: &str) -> Option<bool>;

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.try_get_bool(section, key).unwrap_or(default)
    }
}
