use std::fmt::Debug;
use std::sync::Arc;

/// Hook name external filters are registered under.
pub static REQUEST_ARGS_HOOK: &'static str = "woocommerce_explat_request_args";

pub const DEFAULT_PRIORITY: i32 = 10;

/// Ordered query arguments for an assignment request.
///
/// Keys keep their first insertion position; re-inserting an existing key
/// replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestArgs {
    pairs: Vec<(String, String)>,
}

impl RequestArgs {
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Returns the previous value when the key was already present.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();

        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.pairs.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let idx = self.pairs.iter().position(|(k, _)| k == key)?;
        Some(self.pairs.remove(idx).1)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub(crate) fn as_pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RequestArgs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut args = RequestArgs::new();
        for (k, v) in iter {
            args.insert(k, v);
        }
        args
    }
}

impl IntoIterator for RequestArgs {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.into_iter()
    }
}

/// A transform applied to the request arguments before the url is built.
pub trait RequestArgsFilter: Send + Sync {
    fn apply(&self, args: RequestArgs) -> RequestArgs;
}

impl<F> RequestArgsFilter for F
where
    F: Fn(RequestArgs) -> RequestArgs + Send + Sync,
{
    fn apply(&self, args: RequestArgs) -> RequestArgs {
        self(args)
    }
}

#[derive(Clone)]
struct RegisteredFilter {
    namespace: String,
    priority: i32,
    filter: Arc<dyn RequestArgsFilter>,
}

impl Debug for RegisteredFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredFilter")
            .field("namespace", &self.namespace)
            .field("priority", &self.priority)
            .finish()
    }
}

/// Ordered chain of [`RequestArgsFilter`]s registered against one hook.
///
/// Filters run in ascending priority, and in registration order within the
/// same priority. Each filter receives the output of the previous one.
#[derive(Clone, Debug)]
pub struct FilterPipeline {
    hook_name: String,
    filters: Vec<RegisteredFilter>,
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new(REQUEST_ARGS_HOOK)
    }
}

impl FilterPipeline {
    pub fn new(hook_name: impl Into<String>) -> Self {
        Self {
            hook_name: hook_name.into(),
            filters: Vec::new(),
        }
    }

    pub fn hook_name(&self) -> &str {
        &self.hook_name
    }

    pub fn add_filter(
        &mut self,
        namespace: impl Into<String>,
        filter: impl RequestArgsFilter + 'static,
    ) -> &mut Self {
        self.add_filter_with_priority(namespace, DEFAULT_PRIORITY, filter)
    }

    pub fn add_filter_with_priority(
        &mut self,
        namespace: impl Into<String>,
        priority: i32,
        filter: impl RequestArgsFilter + 'static,
    ) -> &mut Self {
        let entry = RegisteredFilter {
            namespace: namespace.into(),
            priority,
            filter: Arc::new(filter),
        };

        // Insert after every filter with priority <= ours so ties keep registration order.
        let idx = self
            .filters
            .iter()
            .position(|f| f.priority > priority)
            .unwrap_or(self.filters.len());
        self.filters.insert(idx, entry);
        self
    }

    /// Removes every filter registered under `namespace`, returning how many were dropped.
    pub fn remove_filter(&mut self, namespace: &str) -> usize {
        let before = self.filters.len();
        self.filters.retain(|f| f.namespace != namespace);
        before - self.filters.len()
    }

    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn apply(&self, args: RequestArgs) -> RequestArgs {
        self.filters.iter().fold(args, |acc, registered| {
            tracing::trace!(
                hook = %self.hook_name,
                namespace = %registered.namespace,
                "applying request args filter"
            );
            registered.filter.apply(acc)
        })
    }
}
